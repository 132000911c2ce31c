//! # escpos-receipt CLI
//!
//! Command-line interface for encoding and printing estimate receipts.
//!
//! ## Usage
//!
//! ```bash
//! # Write the printer job to a file
//! escpos-receipt encode --receipt estimate.json -o job.bin
//!
//! # Render the raster canvas to PNG
//! escpos-receipt preview --receipt estimate.json --png preview.png
//!
//! # Print over Bluetooth
//! escpos-receipt print --receipt estimate.json --device /dev/rfcomm0
//!
//! # Verbose transport logging
//! RUST_LOG=escpos_receipt=debug escpos-receipt print --receipt estimate.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use escpos_receipt::{
    EncodingPath, ReceiptError,
    encode::{self, raster},
    printer::{EncoderSettings, PaperWidth, Preferences},
    receipt::ReceiptDocument,
    render::{BitmapTypeface, MonoBitmap, TtfTypeface, Typeface},
    transport::{
        Connection, Pacing, RfcommConnector,
        rfcomm::{self, DEFAULT_DEVICE},
    },
};

/// escpos-receipt - Estimate receipts for ESC/POS thermal printers
#[derive(Parser, Debug)]
#[command(name = "escpos-receipt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a receipt and write the printer job to a file
    Encode {
        #[command(flatten)]
        job: JobArgs,

        /// Output file for the raw job bytes
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Render the raster canvas of a receipt to PNG
    Preview {
        #[command(flatten)]
        job: JobArgs,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,

        /// Save the thresholded 1-bit image instead of the canvas
        #[arg(long)]
        mono: bool,
    },

    /// Encode a receipt and send it to the printer
    Print {
        #[command(flatten)]
        job: JobArgs,

        /// RFCOMM device path or a bound Bluetooth MAC address
        #[arg(long, default_value = DEFAULT_DEVICE)]
        device: String,

        /// Bytes per write
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Pause between writes in milliseconds
        #[arg(long)]
        chunk_delay_ms: Option<u64>,

        /// Pause after the last write in milliseconds
        #[arg(long)]
        settle_ms: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Receipt document (JSON)
    #[arg(long, value_name = "FILE")]
    receipt: PathBuf,

    /// Preferences file (JSON)
    #[arg(long, value_name = "FILE")]
    prefs: Option<PathBuf>,

    /// Paper width, overriding the preferences file
    #[arg(long, value_name = "58mm|80mm")]
    paper: Option<PaperWidth>,

    /// TrueType font for the raster path (built-in bitmap font otherwise)
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// Always use the raster path
    #[arg(long)]
    raster: bool,
}

/// Everything needed to encode one job.
struct Job {
    doc: ReceiptDocument,
    settings: EncoderSettings,
    typeface: Box<dyn Typeface>,
    force_raster: bool,
    pacing: Pacing,
}

impl JobArgs {
    fn load(&self) -> Result<Job, ReceiptError> {
        let doc: ReceiptDocument = serde_json::from_str(&fs::read_to_string(&self.receipt)?)?;

        let mut prefs = match &self.prefs {
            Some(path) => Preferences::load(path)?,
            None => Preferences::default(),
        };
        if let Some(paper) = self.paper {
            prefs.print.paper_width = paper;
        }

        let typeface: Box<dyn Typeface> = match &self.font {
            Some(path) => Box::new(TtfTypeface::from_file(path)?),
            None => Box::new(BitmapTypeface),
        };

        Ok(Job {
            doc,
            settings: EncoderSettings::resolve(&prefs.print),
            typeface,
            force_raster: self.raster,
            pacing: prefs.transport,
        })
    }
}

impl Job {
    fn encode(&self) -> Result<Vec<u8>, ReceiptError> {
        let job = if self.force_raster {
            encode::encode_with_path(
                &self.doc,
                &self.settings,
                self.typeface.as_ref(),
                EncodingPath::Raster,
            )?
        } else {
            encode::encode_receipt(&self.doc, &self.settings, self.typeface.as_ref())?
        };
        info!(path = %job.path(), bytes = job.len(), "Encoded receipt");
        Ok(job.into_bytes())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ReceiptError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { job, output } => {
            let bytes = job.load()?.encode()?;
            fs::write(&output, &bytes)?;
            println!("Wrote {} bytes to {}", bytes.len(), output.display());
        }

        Commands::Preview { job, png, mono } => {
            let job = job.load()?;
            let canvas = raster::render_canvas(&job.doc, &job.settings, job.typeface.as_ref())?;
            if mono {
                MonoBitmap::from_rgb(&canvas).to_image().save(&png)?;
            } else {
                canvas.save(&png)?;
            }
            println!(
                "Saved {}x{} preview to {}",
                canvas.width(),
                canvas.height(),
                png.display()
            );
        }

        Commands::Print {
            job,
            device,
            chunk_size,
            chunk_delay_ms,
            settle_ms,
        } => {
            let mut job = job.load()?;
            if let Some(size) = chunk_size {
                job.pacing.chunk_size = size;
            }
            if let Some(ms) = chunk_delay_ms {
                job.pacing.chunk_delay_ms = ms;
            }
            if let Some(ms) = settle_ms {
                job.pacing.settle_delay_ms = ms;
            }

            let bytes = job.encode()?;
            let device = resolve_device(&device)?;
            print_to_device(&device, job.pacing, &bytes).await?;
            println!("Printed successfully!");
        }
    }

    Ok(())
}

/// Accept either a device path or the MAC address of a bound printer.
fn resolve_device(device: &str) -> Result<PathBuf, ReceiptError> {
    if !rfcomm::is_valid_mac(device) {
        return Ok(PathBuf::from(device));
    }
    rfcomm::find_rfcomm_for_mac(device).ok_or_else(|| {
        ReceiptError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!(
                "no RFCOMM device bound to {} (run `sudo rfcomm bind 0 {}`)",
                device, device
            ),
        ))
    })
}

async fn print_to_device(device: &Path, pacing: Pacing, bytes: &[u8]) -> Result<(), ReceiptError> {
    let printer = Connection::with_pacing(RfcommConnector::new(device), pacing);

    let mut states = printer.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            debug!(%state, "Connection state");
        }
    });

    printer.connect().await?;
    let result = printer.print(bytes).await;
    printer.disconnect().await;

    let report = result?;
    info!(chunks = report.chunks, bytes = report.bytes, "Job delivered");
    Ok(())
}
