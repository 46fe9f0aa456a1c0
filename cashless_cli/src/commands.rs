//! Line commands understood by the terminal front end.

use std::str::FromStr;

use cashless_client::state::Tab;

pub const HELP: &str = "These commands are supported:
  help                              Display this text.
  health                            Check that the wallet service is up.
  login <email> <password>          Log in.
  register <email> <password> <name...>
                                    Create an account.
  logout                            End the session.
  profile                           Reload your profile.
  tab <wallet|pay|qr|transactions>  Switch view.
  recharge <amount>                 Add funds.
  search <query>                    Find users by name or email.
  select <n>                        Use search result n as recipient.
  recipient <user_id>               Set the recipient by id.
  scan <payload>                    Use a decoded QR payload as recipient.
  nfc-id <id>                       Use a registered NFC tag id as recipient.
  pay <amount> [description...]     Pay the selected recipient.
  qr                                Generate your payment QR code.
  history                           Show recent transactions.
  state                             Dump the full client state as JSON.
  quit                              Exit.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Health,
    Login { email: String, password: String },
    Register { email: String, password: String, name: String },
    Logout,
    Profile,
    Tab(Tab),
    Recharge(String),
    Search(String),
    Select(usize),
    Recipient(String),
    Scan(String),
    NfcId(String),
    Pay { amount: String, description: String },
    Qr,
    History,
    State,
    Quit,
}

fn usage(command: &str) -> String {
    format!("Usage error for '{}'. Type 'help' for the command list.", command)
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err("Empty command".to_string());
        };
        let args: Vec<&str> = parts.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("help", []) => Command::Help,
            ("health", []) => Command::Health,
            ("login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("register", [email, password, name @ ..]) if !name.is_empty() => Command::Register {
                email: email.to_string(),
                password: password.to_string(),
                name: name.join(" "),
            },
            ("logout", []) => Command::Logout,
            ("profile", []) => Command::Profile,
            ("tab", [tab]) => Command::Tab(tab.parse()?),
            ("recharge", [amount]) => Command::Recharge(amount.to_string()),
            ("search", query) => Command::Search(query.join(" ")),
            ("select", [n]) => Command::Select(n.parse().map_err(|_| usage("select"))?),
            ("recipient", [user_id]) => Command::Recipient(user_id.to_string()),
            // payloads may contain spaces in the user name
            ("scan", payload) if !payload.is_empty() => Command::Scan(payload.join(" ")),
            ("nfc-id", [id]) => Command::NfcId(id.to_string()),
            ("pay", [amount, description @ ..]) => Command::Pay {
                amount: amount.to_string(),
                description: description.join(" "),
            },
            ("qr", []) => Command::Qr,
            ("history", []) => Command::History,
            ("state", []) => Command::State,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) if HELP.contains(&format!("  {}", other)) => return Err(usage(other)),
            (other, _) => return Err(format!("Unknown command: {}", other)),
        };

        Ok(command)
    }
}
