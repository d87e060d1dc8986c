use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Serve `public/` on port 8000 and open a browser at it
///
/// The port and directory are fixed; there is nothing to configure.
#[derive(Debug, clap::Parser)]
#[command(name = "devserve", version)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

impl Cli {
    pub(crate) fn init_logging(&self) {
        let level = self.verbose.log_level_filter();
        if level == log::LevelFilter::Off {
            return;
        }

        let mut builder = env_logger::Builder::new();
        builder.filter(None, level);
        if matches!(level, log::LevelFilter::Debug | log::LevelFilter::Trace) {
            builder.format_timestamp_secs();
        } else {
            // banner-style output, no log decoration
            builder.format(|f, record| {
                use std::io::Write as _;
                writeln!(f, "{}", record.args())
            });
        }
        builder.init();
    }
}
