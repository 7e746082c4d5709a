use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    huddle::cli::main()
}
