//! CLI front end: decodes the input image, hands it to
//! `canvas_vm`'s Tokenizer and trace builder, then either runs the result
//! in-process or emits assembly via `canvas_codegen` and shells out to an
//! external assembler and linker.

mod args;
mod error;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitCode};

use clap::Parser;

use args::{Args, Mode};
use canvas_vm::{build_trace, codel_grid_from_rgba, Interpreter, ShapeTable};
use error::VmError;

fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(args: &Args) -> Result<(), VmError> {
    let img = image::open(&args.file)
        .map_err(|e| VmError::InputError(format!("{}: {e}", args.file)))?
        .to_rgba8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    let rgba = img.into_raw();

    let (grid_w, grid_h, colors) = codel_grid_from_rgba(width, height, &rgba, args.codel_size);
    log::debug!("decoded {width}x{height} image into a {grid_w}x{grid_h} codel grid");

    let table = ShapeTable::tokenize(grid_w, grid_h, colors);
    let program = build_trace(&table, args.capacity)?;
    log::debug!(
        "traced {} instructions over {} shapes",
        program.len(),
        table.shapes().len()
    );

    match args.mode {
        Mode::Run => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut interp = Interpreter::new(program, args.capacity, stdin.lock(), stdout.lock());
            interp.run()?;
            Ok(())
        }
        Mode::Compile => compile(args, &program),
    }
}

fn compile(args: &Args, program: &canvas_vm::Program) -> Result<(), VmError> {
    let input_path = Path::new(&args.file);
    let basename = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());

    let asm_path = format!("{basename}.s");
    let obj_path = format!("{basename}.o");

    let mut asm_text = Vec::new();
    canvas_codegen::compile_to_asm(program, &mut asm_text)?;
    fs::write(&asm_path, &asm_text)
        .map_err(|e| VmError::ToolchainError(format!("writing {asm_path}: {e}")))?;

    run_tool("as", &["-o", &obj_path, &asm_path])?;
    run_tool("ld", &["-o", &basename, &obj_path, "-lSystem", "-e", "_main", "-arch", "x86_64"])?;

    Ok(())
}

fn run_tool(program: &str, args: &[&str]) -> Result<(), VmError> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        VmError::ToolchainError(format!("failed to invoke {program}: {e} (is it installed?)"))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VmError::ToolchainError(format!("{program} failed: {stderr}")));
    }

    std::io::stdout().flush().ok();
    Ok(())
}
