use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};
use grf::{
    Layout,
    source::{self, ConvertOptions, DEFAULT_PIXEL_SIZE, KerningMode},
};
use log::debug;

#[derive(Parser, Debug)]
#[command(
    name = "font2grf",
    about = "Convert a TrueType/OpenType font into a GRF bitmap font",
    allow_negative_numbers = true
)]
struct FontArgs {
    /// Input .ttf/.otf font file
    #[arg(value_name = "INPUT_FONT")]
    input: PathBuf,

    /// Output .grf file
    #[arg(value_name = "OUTPUT_GRF")]
    output: PathBuf,

    /// Pixel size glyphs are rasterized at
    #[arg(value_name = "PIXEL_SIZE", default_value_t = i64::from(DEFAULT_PIXEL_SIZE))]
    pixel_size: i64,

    /// Header layout of the output file
    #[arg(long, value_enum, default_value_t = LayoutArg::Extended)]
    layout: LayoutArg,

    /// Where kerning adjustments come from
    #[arg(long, value_enum, default_value_t = KerningArg::Native)]
    kerning: KerningArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Glyphs only (GRF0)
    Minimal,
    /// Glyphs and kerning (GRF1)
    Extended,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KerningArg {
    None,
    /// The font's kerning table
    Native,
    /// Shape each character pair
    Shaped,
}

impl FontArgs {
    fn options(&self) -> Result<ConvertOptions, clap::Error> {
        let pixel_size = match u16::try_from(self.pixel_size) {
            Ok(size) if size > 0 => size,
            _ if self.pixel_size < 0 => return Err(usage_error("negative pixel size specified")),
            _ => {
                return Err(usage_error(&format!(
                    "pixel size {} is out of range",
                    self.pixel_size
                )));
            }
        };

        Ok(ConvertOptions {
            pixel_size,
            layout: match self.layout {
                LayoutArg::Minimal => Layout::Minimal,
                LayoutArg::Extended => Layout::Extended,
            },
            kerning: match self.kerning {
                KerningArg::None => KerningMode::None,
                KerningArg::Native => KerningMode::Native,
                KerningArg::Shaped => KerningMode::Shaped,
            },
        })
    }
}

fn usage_error(message: &str) -> clap::Error {
    FontArgs::command().error(ErrorKind::InvalidValue, message)
}

fn run(args: &FontArgs, options: &ConvertOptions) -> anyhow::Result<()> {
    let font_data = fs::read(&args.input)
        .with_context(|| format!("failed to read input font {}", args.input.display()))?;

    let (bytes, report) = source::convert(&font_data, options).context("failed to convert font")?;
    debug!("{report:?}");

    fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = FontArgs::parse();
    let options = args.options().unwrap_or_else(|err| err.exit());

    println!("font2grf: parsing font file...");
    match run(&args, &options) {
        Ok(()) => {
            println!("font2grf: done!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("font2grf: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults() {
        let args = FontArgs::try_parse_from(["font2grf", "in.ttf", "out.grf"]).unwrap();
        let options = args.options().unwrap();

        assert_eq!(options.pixel_size, 16);
        assert_eq!(options.layout, Layout::Extended);
        assert_eq!(options.kerning, KerningMode::Native);
    }

    #[test]
    fn explicit_size_and_flags() {
        let args = FontArgs::try_parse_from([
            "font2grf",
            "in.ttf",
            "out.grf",
            "24",
            "--layout",
            "minimal",
            "--kerning",
            "shaped",
        ])
        .unwrap();
        let options = args.options().unwrap();

        assert_eq!(options.pixel_size, 24);
        assert_eq!(options.layout, Layout::Minimal);
        assert_eq!(options.kerning, KerningMode::Shaped);
    }

    #[rstest]
    #[case("-3")]
    #[case("0")]
    #[case("70000")]
    fn unusable_size_is_a_usage_error(#[case] size: &str) {
        let args = FontArgs::try_parse_from(["font2grf", "in.ttf", "out.grf", size]).unwrap();
        let err = args.options().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn largest_size_is_accepted() {
        let args = FontArgs::try_parse_from(["font2grf", "in.ttf", "out.grf", "65535"]).unwrap();
        assert_eq!(args.options().unwrap().pixel_size, u16::MAX);
    }

    #[test]
    fn missing_output_is_a_usage_error() {
        let err = FontArgs::try_parse_from(["font2grf", "in.ttf"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn command_is_well_formed() {
        let command = FontArgs::command();
        assert_eq!(command.get_name(), "font2grf");
        command.debug_assert();
    }
}
