fn main() {
    if let Err(err) = placepix::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
