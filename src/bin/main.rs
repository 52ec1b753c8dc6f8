use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use emulator::region::Image;
use emulator::vm::Vm;

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Run an LS-8 program image", long_about = None)]
struct Args {
  /// Path to a `.ls8` program image
  path: PathBuf,
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

  let args = Args::parse();
  let image = Image::from_path(&args.path)?;

  let mut vm = Vm::new();
  vm.load(&image)
    .with_context(|| format!("{} does not fit in memory", args.path.display()))?;

  let stdout = io::stdout();
  let mut out = stdout.lock();
  let result = vm.run(&mut out);
  out.flush()?;
  result.with_context(|| format!("program faulted at {:#04x}", vm.pc()))
}
