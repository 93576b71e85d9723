use std::{borrow::Cow, env, fs, process};

use billsplit_application::AppConfig;
use billsplit_domain::{Receipt, SplitMode};
use billsplit_infrastructure::{SharePayload, decode_payload, decode_share_url, share_url};
use billsplit_presentation::{SummaryPresenter, participant_label};

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage: billsplit-interpreter <share-url|payload> [--svg <path>] [--link]";

struct Args {
    input: String,
    svg_path: Option<String>,
    print_link: bool,
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = AppConfig::from_env();

    let payload = decode_share_url(&args.input)
        .or_else(|| decode_payload(Some(args.input.as_str())))
        .ok_or("Input is neither a share link nor an encoded payload")?;
    tracing::debug!(
        version = payload.version,
        participants = payload.split.participants.len(),
        items = payload.receipt.items.len(),
        "Decoded share payload"
    );

    print_summary(&payload, &config.display_name);

    if let Some(path) = &args.svg_path {
        let view = SummaryPresenter::render_with_items(
            &payload.split,
            &payload.receipt,
            &config.display_name,
        );
        fs::write(path, view.table_svg)
            .map_err(|err| format!("Failed to write '{path}': {err}"))?;
        println!("Wrote {path}");
    }

    if args.print_link {
        let link = share_url(&config.share_base_url, &payload)
            .map_err(|err| format!("Failed to encode share link: {err}"))?;
        println!("{link}");
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> CliResult<Args> {
    let mut input = None;
    let mut svg_path = None;
    let mut print_link = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--svg" => {
                let Some(path) = args.next() else {
                    return Err("--svg needs a path".into());
                };
                svg_path = Some(path);
            }
            "--link" => print_link = true,
            _ if input.is_none() => input = Some(arg),
            _ => return Err(format!("Unexpected argument '{arg}'\n{USAGE}").into()),
        }
    }

    let Some(input) = input else {
        return Err(USAGE.into());
    };
    Ok(Args {
        input,
        svg_path,
        print_link,
    })
}

fn print_summary(payload: &SharePayload, local_name: &str) {
    let summary = &payload.split;
    println!("{}", SummaryPresenter::caption(summary));

    for (idx, participant) in summary.participants.iter().enumerate() {
        let mut flags = String::new();
        if participant.is_payer {
            flags.push_str(" [paid]");
        }
        if !participant.is_included {
            flags.push_str(" [excluded]");
        }
        println!(
            "  {:<24} {:>10}{flags}",
            participant_label(participant, idx + 1, local_name),
            participant.owed.to_string()
        );
    }
    if summary.unallocated.is_positive() {
        println!("  {:<24} {:>10}", "(unallocated)", summary.unallocated.to_string());
    }

    print_receipt(&payload.receipt, summary.mode);
}

fn print_receipt(receipt: &Receipt, mode: SplitMode) {
    if receipt.items.is_empty() {
        return;
    }

    println!("Items:");
    for item in &receipt.items {
        let price = item.price.map(|price| price.to_string()).unwrap_or_default();
        if mode == SplitMode::ByItems {
            println!(
                "  {:<24} {:>10}  ({} assigned)",
                item.label,
                price,
                item.assigned.len()
            );
        } else {
            println!("  {:<24} {:>10}", item.label, price);
        }
    }
    println!(
        "  subtotal {}  fees {}  tax {}  tip {}  discount {}  total {}",
        receipt.subtotal, receipt.fees, receipt.tax, receipt.tip, receipt.discount, receipt.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> CliResult<Args> {
        parse_args(raw.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn input_and_flags_in_any_order() {
        let parsed = args(&["--svg", "out.svg", "abc", "--link"]).expect("parsed");
        assert_eq!(parsed.input, "abc");
        assert_eq!(parsed.svg_path.as_deref(), Some("out.svg"));
        assert!(parsed.print_link);
    }

    #[test]
    fn missing_input_prints_usage() {
        assert!(matches!(args(&[]), Err(message) if message == USAGE));
    }

    #[test]
    fn svg_without_path_is_rejected() {
        assert!(args(&["abc", "--svg"]).is_err());
    }

    #[test]
    fn second_positional_is_rejected() {
        assert!(args(&["abc", "def"]).is_err());
    }
}
