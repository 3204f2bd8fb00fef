use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use payline_core::AggregatedTransaction;
use payline_directory::{
    AccountResources, Directory, DirectoryClient, SubmissionDriver, SubmissionReport,
};
use payline_import::{aggregate_transactions, import_settlements, IdentityResolver, ResolutionEvent};
use tracing::{debug, info, warn};

use crate::config::{read_api_key, Settings};
use crate::report::render_table;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_file: PathBuf,
    pub dry_run: bool,
}

/// Loads and nets the settlement file, then reconciles it against the live
/// directory. Returns `None` when the file holds nothing payable.
pub async fn run(settings: &Settings, opts: &RunOptions) -> anyhow::Result<Option<SubmissionReport>> {
    let aggregated = load_transactions(settings, opts)?;
    if aggregated.is_empty() {
        info!(
            "no payable settlements in {}; nothing to submit",
            opts.input_file.display()
        );
        return Ok(None);
    }

    let api_key = read_api_key(&settings.api_key_file)?;
    let client = DirectoryClient::authenticate(&settings.api, &api_key)
        .await
        .context("authenticating with the directory")?;
    debug!("authenticated");

    reconcile(&client, settings, aggregated, opts.dry_run)
        .await
        .map(Some)
}

pub fn load_transactions(
    settings: &Settings,
    opts: &RunOptions,
) -> anyhow::Result<Vec<AggregatedTransaction>> {
    let path = &opts.input_file;
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let raw = import_settlements(BufReader::new(file), &settings.import)
        .with_context(|| format!("reading {}", path.display()))?;
    debug!("raw settlements:\n{}", render_table(&raw));

    let aggregated = aggregate_transactions(&raw);
    debug!("aggregated transactions:\n{}", render_table(&aggregated));
    info!(
        rows = raw.len(),
        members = aggregated.len(),
        aliases = settings.import.aliases.len(),
        "loaded settlements from {}",
        path.display()
    );
    Ok(aggregated)
}

/// Resolves identities against the directory and submits what resolved.
pub async fn reconcile<D: Directory>(
    directory: &D,
    settings: &Settings,
    aggregated: Vec<AggregatedTransaction>,
    dry_run: bool,
) -> anyhow::Result<SubmissionReport> {
    let resources = AccountResources::discover(directory)
        .await
        .context("discovering account resources")?;

    let contacts = directory
        .list_active_contacts(&resources.contacts)
        .await
        .context("listing active contacts")?;
    debug!(count = contacts.len(), "retrieved contacts");

    let resolution = IdentityResolver::new(&contacts).resolve(aggregated);
    for event in &resolution.events {
        log_event(event);
    }
    info!(
        resolved = resolution.resolved().count(),
        unresolved = resolution.unresolved_count(),
        warnings = resolution.warnings().count(),
        "matched transactions to contacts"
    );

    let driver = SubmissionDriver::prepare(directory, resources, &settings.submission, dry_run)
        .await
        .context("preparing submission")?;
    debug!(tender_id = %driver.tender_id(), "submitting");
    let report = driver.submit(&resolution.transactions).await?;

    info!(
        submitted = report.submitted.len(),
        skipped = report.skipped,
        dry_run = report.dry_run,
        "run complete"
    );
    Ok(report)
}

fn log_event(event: &ResolutionEvent) {
    if event.is_warning() {
        warn!("{event}");
    } else {
        debug!("{event}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payline_core::{
        AccountDescriptor, AccountResource, Contact, ContactId, InvoiceId, Money, Tender, TenderId,
    };
    use payline_directory::{DirectoryCall, MockDirectory};
    use std::io::Write;

    fn account() -> AccountDescriptor {
        AccountDescriptor {
            id: 1,
            name: "Club".into(),
            resources: ["Contacts", "Invoices", "Tenders", "Payments"]
                .iter()
                .map(|n| AccountResource {
                    name: n.to_string(),
                    url: format!("https://api/{n}"),
                })
                .collect(),
        }
    }

    fn directory() -> MockDirectory {
        MockDirectory::new(
            vec![account()],
            vec![
                Contact {
                    id: ContactId(1),
                    email: "a@x.com".into(),
                    first_name: "Amy".into(),
                    last_name: "Able".into(),
                },
                Contact {
                    id: ContactId(2),
                    email: "jeffs@injectech.us".into(),
                    first_name: "Jeff".into(),
                    last_name: "S".into(),
                },
            ],
            vec![Tender {
                id: TenderId(9),
                name: "Payline".into(),
                url: None,
            }],
        )
    }

    fn input(body: &str) -> (tempfile::NamedTempFile, RunOptions) {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "first_name,last_name,email,amount,type,status\n{body}").unwrap();
        let opts = RunOptions {
            input_file: f.path().to_path_buf(),
            dry_run: false,
        };
        (f, opts)
    }

    fn settings() -> Settings {
        Settings::from_toml(
            r#"
[import.aliases]
"larry@injectech.us" = "jeffs@injectech.us"
"#,
        )
        .unwrap()
    }

    #[test]
    fn load_nets_and_filters() {
        let (_f, opts) = input(
            "Amy,Able,a@x.com,10,settle,complete\n\
             Amy,Able,a@x.com,5,settle,complete\n\
             Amy,Able,a@x.com,5,refund,complete\n",
        );
        let aggs = load_transactions(&settings(), &opts).unwrap();
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].email, "a@x.com");
        assert_eq!(aggs[0].amount, Money::from_cents(1500));
    }

    #[test]
    fn load_missing_file_is_fatal() {
        let opts = RunOptions {
            input_file: PathBuf::from("/no/such/settlements.csv"),
            dry_run: false,
        };
        assert!(load_transactions(&settings(), &opts).is_err());
    }

    #[tokio::test]
    async fn reconcile_submits_resolved_and_skips_unmatched() {
        let (_f, opts) = input(
            "Amy,Able,a@x.com,10,settle,complete\n\
             Casper,Ghost,ghost@x.com,3,settle,complete\n\
             Larry,S,LARRY@injectech.us,20,settle,complete\n",
        );
        let aggs = load_transactions(&settings(), &opts).unwrap();
        let dir = directory();
        let report = reconcile(&dir, &settings(), aggs, false).await.unwrap();

        let emails: Vec<_> = report.submitted.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, ["a@x.com", "jeffs@injectech.us"]);
        assert_eq!(report.skipped, 1);
        assert_eq!(dir.write_count(), 4);
    }

    #[tokio::test]
    async fn dry_run_resolves_identically_without_writes() {
        let body = "Amy,Able,a@x.com,10,settle,complete\n\
                    Casper,Ghost,ghost@x.com,3,settle,complete\n";
        let (_f, opts) = input(body);

        let live_dir = directory();
        let live = reconcile(&live_dir, &settings(), load_transactions(&settings(), &opts).unwrap(), false)
            .await
            .unwrap();

        let dry_dir = directory();
        let dry = reconcile(&dry_dir, &settings(), load_transactions(&settings(), &opts).unwrap(), true)
            .await
            .unwrap();

        let live_emails: Vec<_> = live.submitted.iter().map(|p| (&p.email, p.amount)).collect();
        let dry_emails: Vec<_> = dry.submitted.iter().map(|p| (&p.email, p.amount)).collect();
        assert_eq!(live_emails, dry_emails);
        assert_eq!(live.skipped, dry.skipped);
        assert!(dry.submitted.iter().all(|p| p.invoice_id == InvoiceId::DRY_RUN));
        assert_eq!(dry_dir.write_count(), 0);
        assert!(live_dir.write_count() > 0);
    }

    #[tokio::test]
    async fn missing_tender_aborts_run() {
        let (_f, opts) = input("Amy,Able,a@x.com,10,settle,complete\n");
        let mut dir = directory();
        dir.tenders.clear();
        let err = reconcile(&dir, &settings(), load_transactions(&settings(), &opts).unwrap(), false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Unable to find 'Payline' tender"), "{err:#}");
        assert!(dir.calls().iter().all(|c| !c.is_write()));
        assert!(dir.calls().contains(&DirectoryCall::ListActiveContacts("https://api/Contacts".into())));
    }
}
