fn main() {
    if let Err(e) = gifaway_lib::run() {
        eprintln!("gifaway: {e}");
        std::process::exit(1);
    }
}
