use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::blockchain::bridge::Route;
use crate::core::wallet_info::WalletSelection;

/// Union bridge bot: USDC transfers out of Sepolia through the UCS03 contract.
#[derive(Debug, Parser)]
#[command(name = "union_bridge", version, about = "Union testnet bridge bot")]
pub struct Cli {
    /// Config file (defaults to $CONFIG_PATH or ./config.toml)
    #[arg(long, env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Wallet file, overriding the config
    #[arg(long)]
    pub wallet_file: Option<PathBuf>,

    /// Wallet indices, comma separated; 0 selects all
    #[arg(long)]
    pub wallets: Option<String>,

    /// Transactions per wallet
    #[arg(long)]
    pub count: Option<String>,

    /// 1 = Sepolia → Babylon, 2 = Sepolia → Holesky, 0 = all routes
    #[arg(long)]
    pub route: Option<String>,
}

/// Parse comma-separated wallet indices.
///
/// `0` anywhere selects every wallet. Unparseable or out-of-range entries are
/// dropped; nothing left selects the first wallet.
pub fn parse_wallet_selection(input: &str, wallet_count: usize) -> WalletSelection {
    let mut positions: Vec<usize> = Vec::new();
    for part in input.split(',') {
        let Some(index) = parse_leading_int(part) else { continue };
        if index == 0 {
            return WalletSelection::All;
        }
        let Ok(index) = usize::try_from(index) else { continue };
        if index <= wallet_count && !positions.contains(&index) {
            positions.push(index);
        }
    }
    if positions.is_empty() {
        positions.push(1);
    }
    WalletSelection::Positions(positions)
}

/// Integer prefix of `input`: optional sign, then decimal digits up to the
/// first other character (`"3abc"` is 3, `"2.5"` is 2). Saturates on overflow.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

/// Positive integer prefix, anything else counts as 1.
pub fn parse_transaction_count(input: &str) -> u32 {
    match parse_leading_int(input) {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// `0` runs every route; unknown input falls back to route 1.
pub fn parse_route_choice(input: &str) -> Vec<Route> {
    match parse_leading_int(input) {
        Some(0) => Route::ALL.to_vec(),
        Some(key) => {
            let route = u32::try_from(key).ok().and_then(Route::from_menu_key);
            vec![route.unwrap_or(Route::SepoliaBabylon)]
        }
        None => vec![Route::SepoliaBabylon],
    }
}

/// Line-based prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn select_wallets(&mut self, names: &[String]) -> io::Result<WalletSelection> {
        writeln!(self.output, "Available wallets:")?;
        writeln!(self.output, "[0] All wallets")?;
        for (i, name) in names.iter().enumerate() {
            writeln!(self.output, "[{}] {}", i + 1, name)?;
        }
        let answer = self.ask("Select wallets (e.g. 1,2 or 0 for all): ")?;
        Ok(parse_wallet_selection(&answer, names.len()))
    }

    pub fn transaction_count(&mut self) -> io::Result<u32> {
        let answer = self.ask("Number of transactions per wallet: ")?;
        Ok(parse_transaction_count(&answer))
    }

    pub fn select_routes(&mut self) -> io::Result<Vec<Route>> {
        writeln!(self.output, "Routes:")?;
        for route in Route::ALL {
            writeln!(self.output, "[{}] {}", route.menu_key(), route)?;
        }
        writeln!(self.output, "[0] All routes")?;
        let answer = self.ask("Select route: ")?;
        Ok(parse_route_choice(&answer))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
