use clap::{Parser, Subcommand};
use std::path::PathBuf;

use medilabel_core::config::probe_timeout_from_env_value;
use medilabel_core::constants::{
    DEFAULT_DATA_DIR, DEFAULT_LABEL_ATTRIBUTION, MAX_LABELS_PER_LINE,
};
use medilabel_core::{
    AuditWritePolicy, AuthService, BasketError, CatalogStore, CoreConfig, HttpAuditSink,
    LocalAuditLog, PatientDirectory, PatientSelection, PdfLabelSurface, PrintPipeline,
};
use medilabel_types::{ExpiryMonth, ExpiryYear};

mod state;
use state::StateFiles;

#[derive(Parser)]
#[command(name = "medilabel")]
#[command(about = "Medication label printing CLI")]
struct Cli {
    /// Directory holding the store and state files
    #[arg(long, env = "MEDILABEL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Base URL of the remote audit sink; omit for local-only audit
    #[arg(long, env = "MEDILABEL_AUDIT_URL")]
    audit_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as an operator
    Login {
        username: String,
        password: String,
    },
    /// Sign out and drop the patient selection and basket
    Logout,
    /// Search and select the active patient
    Patient {
        /// Patient identifier
        patient_id: u32,
        /// Registration year
        year: u16,
    },
    /// List the medication catalog
    Medications {
        /// Filter over drug names and instructions
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a medication to the basket
    Add {
        /// Drug name as it should appear on the label
        drug_name: String,
        /// Dosing instruction; defaults to the catalog's for this drug
        #[arg(long)]
        instruction: Option<String>,
    },
    /// Show the basket
    Basket,
    /// Remove one basket line
    Remove {
        /// Basket line id
        id: u64,
    },
    /// Set or clear a basket line's expiry components
    Expiry {
        /// Basket line id
        id: u64,
        /// Expiry month, 1-12
        #[arg(long)]
        month: Option<u8>,
        /// Two-digit expiry year, 26-50
        #[arg(long)]
        year: Option<u8>,
        /// Clear both components
        #[arg(long)]
        clear: bool,
    },
    /// Clear the whole basket
    Clear,
    /// Print labels for the basket and record the audit trail
    Print {
        /// Label copies per basket line
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// Output PDF path; defaults to labels.pdf in the data directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect or clear the local audit log
    Audit {
        /// Show only entries without a confirmed remote audit id
        #[arg(long)]
        unreconciled: bool,
        /// Clear the local audit log
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let probe_timeout =
        probe_timeout_from_env_value(std::env::var("MEDILABEL_PROBE_TIMEOUT_MS").ok())?;
    let attribution = std::env::var("MEDILABEL_ATTRIBUTION")
        .unwrap_or_else(|_| DEFAULT_LABEL_ATTRIBUTION.into());

    let cfg = CoreConfig::new(
        cli.data_dir.clone(),
        cli.audit_url.clone(),
        probe_timeout,
        attribution,
    )?;
    let files = StateFiles::new(cfg.data_dir());

    match cli.command {
        Some(Commands::Login { username, password }) => {
            let auth = AuthService::load(&cfg.users_path())?;
            match auth.login(&username, &password) {
                Some(operator) => {
                    let mut session = files.load_session()?;
                    let full_name = operator.full_name.clone();
                    session.sign_in(operator);
                    files.save_session(&session)?;
                    println!("Welcome {full_name}!");
                }
                None => eprintln!("Invalid username or password"),
            }
        }
        Some(Commands::Logout) => {
            let mut session = files.load_session()?;
            session.sign_out();
            files.save_session(&session)?;

            let mut basket = files.load_basket()?;
            basket.clear();
            files.save_basket(&basket)?;

            println!("Signed out.");
        }
        Some(Commands::Patient { patient_id, year }) => {
            let directory = PatientDirectory::load(&cfg.patients_path())?;
            match directory.find(patient_id, year) {
                Some(patient) => {
                    let mut session = files.load_session()?;
                    session.select_patient(PatientSelection::from(patient));
                    files.save_session(&session)?;

                    println!("Patient found:");
                    println!("  Name: {}", patient.patient_name);
                    println!("  ID: {}", patient.full_id());
                    println!("  National ID: {}", patient.national_id);
                }
                None => eprintln!("Patient not found with ID: {patient_id} and year: {year}"),
            }
        }
        Some(Commands::Medications { search }) => {
            let catalog = CatalogStore::load(&cfg.catalog_path())?;
            let medications = catalog.search(search.as_deref().unwrap_or(""));
            if medications.is_empty() {
                println!("No medications found.");
            } else {
                for medication in medications {
                    match &medication.barcode {
                        Some(barcode) => println!(
                            "{} - {} (barcode {barcode})",
                            medication.drug_name,
                            medication.instruction_or_default()
                        ),
                        None => println!(
                            "{} - {}",
                            medication.drug_name,
                            medication.instruction_or_default()
                        ),
                    }
                }
            }
        }
        Some(Commands::Add {
            drug_name,
            instruction,
        }) => {
            let session = files.load_session()?;
            if !session.has_patient() {
                eprintln!("Select a patient before adding to the basket.");
                return Ok(());
            }

            let catalog = CatalogStore::load(&cfg.catalog_path())?;
            let instruction = instruction
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| {
                    catalog
                        .get(&drug_name)
                        .map(|m| m.instruction_or_default().to_string())
                        .unwrap_or_else(|| {
                            medilabel_core::constants::DEFAULT_INSTRUCTION.to_string()
                        })
                });

            let mut basket = files.load_basket()?;
            match basket.add(&drug_name, &instruction) {
                Ok(id) => {
                    files.save_basket(&basket)?;
                    println!("Added {drug_name} to basket (line {id}).");
                }
                Err(e) => eprintln!("Cannot add to basket: {e}"),
            }
        }
        Some(Commands::Basket) => {
            let basket = files.load_basket()?;
            if basket.is_empty() {
                println!("Basket is empty.");
            } else {
                println!("Basket ({} items):", basket.len());
                let mut lines = basket.snapshot();
                lines.sort_by(|a, b| {
                    a.drug_name
                        .as_str()
                        .to_lowercase()
                        .cmp(&b.drug_name.as_str().to_lowercase())
                });
                for line in lines {
                    let expiry = match line.expiry_date() {
                        Some(date) => date.short(),
                        None => "expiry not set".to_string(),
                    };
                    println!(
                        "  [{}] {} - {} ({})",
                        line.id, line.drug_name, line.instruction_text, expiry
                    );
                }
            }
        }
        Some(Commands::Remove { id }) => {
            let mut basket = files.load_basket()?;
            basket.remove(id);
            files.save_basket(&basket)?;
            println!("Removed basket line {id}.");
        }
        Some(Commands::Expiry {
            id,
            month,
            year,
            clear,
        }) => {
            let month = match month.map(ExpiryMonth::new).transpose() {
                Ok(month) => month,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(());
                }
            };
            let year = match year.map(ExpiryYear::new).transpose() {
                Ok(year) => year,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(());
                }
            };

            let mut basket = files.load_basket()?;
            let result = if clear {
                basket
                    .set_expiry_month(id, None)
                    .and_then(|()| basket.set_expiry_year(id, None))
            } else {
                let mut result = Ok(());
                if month.is_some() {
                    result = basket.set_expiry_month(id, month);
                }
                if result.is_ok() && year.is_some() {
                    result = basket.set_expiry_year(id, year);
                }
                result
            };

            match result {
                Ok(()) => {
                    files.save_basket(&basket)?;
                    if let Some(line) = basket.get(id) {
                        match line.expiry_date() {
                            Some(date) => println!("Expiry for line {id}: {}", date.short()),
                            None => println!("Expiry for line {id}: incomplete"),
                        }
                    }
                }
                Err(e @ BasketError::LineNotFound(_)) => eprintln!("{e}"),
                Err(e) => eprintln!("Cannot set expiry: {e}"),
            }
        }
        Some(Commands::Clear) => {
            let mut basket = files.load_basket()?;
            basket.clear();
            files.save_basket(&basket)?;
            println!("Basket cleared.");
        }
        Some(Commands::Print { quantity, output }) => {
            if quantity > MAX_LABELS_PER_LINE {
                eprintln!("Quantity is capped at {MAX_LABELS_PER_LINE} labels per medication.");
                return Ok(());
            }

            let session = files.load_session()?;
            let mut basket = files.load_basket()?;

            let remote = match cfg.remote_audit_url() {
                Some(url) => Some(HttpAuditSink::new(url, cfg.probe_timeout())?),
                None => None,
            };
            let policy = AuditWritePolicy::new(
                remote,
                LocalAuditLog::new(cfg.local_audit_path()),
                cfg.probe_timeout(),
            );

            let output = output.unwrap_or_else(|| cfg.data_dir().join("labels.pdf"));
            let surface = PdfLabelSurface::new(output.clone());
            let pipeline = PrintPipeline::new(policy, surface, cfg.label_attribution());

            match pipeline.execute(&session, &mut basket, quantity).await {
                Ok(outcome) => {
                    files.save_basket(&basket)?;
                    println!("Labels printed successfully!");
                    println!(
                        "  {} labels written to {}",
                        outcome.labels_rendered,
                        output.display()
                    );
                    if outcome.audit.remote_attempted {
                        println!(
                            "  Audit: {}/{} records confirmed remotely, {} kept locally",
                            outcome.audit.remote_succeeded,
                            outcome.audit.intents,
                            outcome.audit.locally_written
                        );
                    } else {
                        println!(
                            "  Audit: remote sink unavailable, {} records kept locally",
                            outcome.audit.locally_written
                        );
                    }
                }
                Err(e) => eprintln!("Cannot print: {e}"),
            }
        }
        Some(Commands::Audit {
            unreconciled,
            clear,
        }) => {
            let log = LocalAuditLog::new(cfg.local_audit_path());
            if clear {
                log.clear()?;
                println!("Local audit log cleared.");
            } else {
                let entries = if unreconciled {
                    log.unreconciled()?
                } else {
                    log.list()?
                };
                if entries.is_empty() {
                    println!("No local audit entries.");
                } else {
                    println!("Local audit entries ({}):", entries.len());
                    for entry in entries {
                        let reconciled = if entry.remote_audit_id.is_some() {
                            ""
                        } else {
                            " [unreconciled]"
                        };
                        println!(
                            "  {} {} {} - {} (by {}){}",
                            entry.id,
                            entry.record.timestamp.format("%Y-%m-%d %H:%M"),
                            entry.record.patient_name,
                            entry.record.drug_name,
                            entry.record.printed_by,
                            reconciled
                        );
                    }
                }
            }
        }
        None => {
            println!("Use 'medilabel --help' for commands");
        }
    }

    Ok(())
}
