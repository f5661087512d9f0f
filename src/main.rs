// Certificate verification system command-line shell.
// All verification logic lives in the library; this binary wires the
// subcommands together and prints the report.

use certverify::models::{Decision, OcrResult, SealVerdict, VerificationResult};
use certverify::processing::OcrClient;
use certverify::validation::RegistryStore;
use certverify::CertificateVerifier;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "certverify", about = "Verify scanned certificates against a registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a certificate from an OCR result (or an image via the OCR service)
    Verify {
        /// Path to the registry database
        #[arg(long, default_value = "certs.db")]
        db: PathBuf,
        /// OCR result JSON file to verify
        #[arg(long, conflicts_with = "image")]
        ocr_json: Option<PathBuf>,
        /// Certificate image to send to the OCR service
        #[arg(long)]
        image: Option<PathBuf>,
        /// OCR service API key (required with --image)
        #[arg(long, env = "OCRSPACE_API_KEY")]
        api_key: Option<String>,
        /// Optional seal classifier verdict JSON file
        #[arg(long)]
        seal_json: Option<PathBuf>,
        /// Emit the full result as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Bulk-import registry records from a JSON array
    Import {
        #[arg(long, default_value = "certs.db")]
        db: PathBuf,
        /// JSON file containing an array of registry records
        records: PathBuf,
    },
    /// Probe the registry store for an identifier
    Lookup {
        #[arg(long, default_value = "certs.db")]
        db: PathBuf,
        identifier: String,
        /// Treat the identifier as a prefix
        #[arg(long)]
        prefix: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Verify { db, ocr_json, image, api_key, seal_json, json } => {
            run_verify(db, ocr_json, image, api_key, seal_json, json)
        }
        Command::Import { db, records } => run_import(db, records),
        Command::Lookup { db, identifier, prefix } => run_lookup(db, identifier, prefix),
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(64);
        }
    }
}

fn run_verify(
    db: PathBuf,
    ocr_json: Option<PathBuf>,
    image: Option<PathBuf>,
    api_key: Option<String>,
    seal_json: Option<PathBuf>,
    json: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let ocr: OcrResult = match (ocr_json, image) {
        (Some(path), _) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        (None, Some(path)) => {
            let api_key =
                api_key.ok_or("an OCR API key is required with --image (set OCRSPACE_API_KEY)")?;
            OcrClient::new(api_key)?.parse_image(&path)?
        }
        (None, None) => return Err("one of --ocr-json or --image is required".into()),
    };

    let seal: Option<SealVerdict> = match seal_json {
        Some(path) => Some(serde_json::from_reader(BufReader::new(File::open(path)?))?),
        None => None,
    };

    let store = RegistryStore::open(&db)?;
    let verifier = CertificateVerifier::new(store);
    let result = verifier.verify_with_seal(&ocr, seal.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(match result.decision {
        Decision::Authentic => 0,
        Decision::Suspect => 1,
        Decision::Rejected => 2,
    })
}

fn run_import(db: PathBuf, records: PathBuf) -> Result<i32, Box<dyn std::error::Error>> {
    let store = RegistryStore::open_or_create(&db)?;
    let imported = store.import_json(&records)?;
    println!("Imported {} records into {:?} ({} total)", imported, db, store.count()?);
    Ok(0)
}

fn run_lookup(db: PathBuf, identifier: String, prefix: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let store = RegistryStore::open(&db)?;
    if prefix {
        let records = store.lookup_by_prefix(&identifier)?;
        println!("{} record(s) match prefix {}", records.len(), identifier);
        for record in records {
            println!("  {}: {} ({}, {})", record.reg_no, record.name, record.institution, record.year);
        }
    } else {
        match store.lookup_by_id(&identifier)? {
            Some(record) => {
                println!("Found: {}", record.reg_no);
                println!("  Name: {}", record.name);
                println!("  Institution: {}", record.institution);
                println!("  Degree: {}", record.degree);
                println!("  Year: {}", record.year);
            }
            None => println!("No record for {}", identifier),
        }
    }
    Ok(0)
}

// Print a detailed verification report
fn print_report(result: &VerificationResult) {
    println!("\n===============================================");
    println!("      CERTIFICATE VERIFICATION REPORT");
    println!("===============================================\n");

    println!("DECISION: {}", result.decision);
    println!("Confidence Score: {:.1}%", result.final_score * 100.0);
    println!(
        "Registration Number: {}",
        result.registration_no.as_deref().unwrap_or("Not Found")
    );

    println!("\nDATABASE RECORD:");
    match &result.db_record {
        Some(record) => {
            println!("  Name: {}", record.name);
            println!("  Institution: {}", record.institution);
            println!("  Degree: {}", record.degree);
            println!("  Year: {}", record.year);
        }
        None => println!("  No matching record found"),
    }

    println!("\nOCR EXTRACTED:");
    let missing = "Not extracted";
    println!("  Name: {}", result.extracted.name.as_deref().unwrap_or(missing));
    println!(
        "  Institution: {}",
        result.extracted.institution.as_deref().unwrap_or(missing)
    );
    println!("  Degree: {}", result.extracted.degree.as_deref().unwrap_or(missing));
    match result.extracted.year {
        Some(year) => println!("  Year: {}", year),
        None => println!("  Year: {}", missing),
    }

    println!("\nFIELD SCORES:");
    for score in result.field_scores.values() {
        println!("  {}: {:.1}%", score.field, score.similarity * 100.0);
    }

    println!("\nREASONS:");
    for reason in &result.reasons {
        println!("  - {}", reason);
    }
}
