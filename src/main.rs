use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    abstract_pairs::app::run_pipeline_cli(std::env::args().skip(1))
}
