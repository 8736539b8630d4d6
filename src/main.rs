fn main() {
    if let Err(err) = carecompanion_lib::run() {
        eprintln!("carecompanion: {err:#}");
        std::process::exit(1);
    }
}
