use clap::{Parser, ValueEnum};

/// Interpreter and compiler for Piet programs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input image file.
    #[arg(short, long)]
    pub file: String,

    /// Codel size, in source pixels, for magnified source images.
    #[arg(long, default_value_t = 1)]
    pub codel_size: usize,

    /// Stack capacity.
    #[arg(long, default_value_t = 512)]
    pub capacity: usize,

    /// Whether to interpret the traced program directly or emit assembly
    /// and invoke an external assembler/linker.
    #[arg(short, long, value_enum, default_value = "run")]
    pub mode: Mode,

    /// Raise the default log filter to debug.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Run,
    Compile,
}
