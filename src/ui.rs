/// Console output
///
/// Status lines carry a "mercado: " prefix and are serialized through a
/// lock; the error prefix is colored when the terminal supports it.

use lazy_static::lazy_static;
use std::io::Write;
use std::sync::Mutex;

lazy_static! {
    static ref CONSOLE: Mutex<()> = Mutex::new(());
}

/// Run `f` while holding the console lock
fn with_console<F: FnOnce()>(f: F) {
    let _guard = CONSOLE.lock();
    f();
}

/// Print colored bold text, falling back to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        let Some(mut t) = term::stdout() else {
            return false;
        };
        if t.fg(fg).is_err() {
            return false;
        }
        let _ = t.attr(term::Attr::Bold);
        if write!(t, "{}", s).is_err() {
            return false;
        }
        let _ = t.reset();
        true
    }
}

/// Print a status message with the "mercado: " prefix
pub fn status(s: &str) {
    with_console(|| {
        print!("mercado: ");
        println!("{}", s);
    });
}

/// Announce a pipeline stage
pub fn stage(s: &str) {
    with_console(|| {
        print!("mercado: ");
        print_color("==>", term::color::BRIGHT_BLUE);
        println!(" {}", s);
    });
}

/// Print an error message with a red "error" prefix
pub fn print_error(msg: &str) {
    with_console(|| {
        println!();
        print_color("error", term::color::BRIGHT_RED);
        println!(": {}", msg);
        println!();
    });
}
