use clap::Parser;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    #[arg(short, long, default_value_t = String::from("input.efs"))]
    pub infile: String,

    /// Log every skipped atom and intermediate count
    #[arg(short, long)]
    pub verbose: bool,
}
