use std::io::{self, Write};

use clap::Parser;
use iconc::{print, Args, Compiler, Config, Error};
use log::{error, info};

fn main() -> Result<(), Error> {
    env_logger::builder()
        .format(|buf, record| {
            let ts = buf.timestamp_micros();
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{}: {:?}: {style}{}{style:#}: {}",
                ts,
                std::thread::current().id(),
                record.level(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    let config = Config::new(args)?;
    let mut compiler = Compiler::from_config(config)?;

    let summary = match compiler.run() {
        Ok(summary) => summary,
        Err(Error::GlyphsFailed(failures)) => {
            for failure in failures.iter() {
                error!("{failure}");
            }
            return Err(Error::GlyphsFailed(failures));
        }
        Err(e) => return Err(e),
    };

    for failure in summary.failures.iter() {
        error!("{failure}");
    }
    for path in summary.artifacts.iter() {
        info!("Wrote {path:?}");
    }

    let mut out = io::stdout().lock();
    if summary.changelog.is_empty() {
        print(&mut out, format_args!("No changes, still at {}", summary.version))?;
    } else {
        print(&mut out, summary.release_notes().trim_end())?;
        if summary.persisted {
            print(&mut out, format_args!("Released {}", summary.version))?;
        } else {
            print(&mut out, format_args!("Dry run, manifest left at {}", summary.version))?;
        }
    }
    Ok(())
}
