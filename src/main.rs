fn main() {
    if let Err(e) = bulkscan_intake::run() {
        eprintln!("bulkscan-intake failed to start: {e}");
        std::process::exit(1);
    }
}
