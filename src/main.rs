//! rw - browse the reflog and undo the last thing you did

fn main() {
    if let Err(e) = rewind::cli::run() {
        rewind::ui::output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
