use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    repartee::cli::main()
}
