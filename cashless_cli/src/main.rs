mod commands;

use anyhow::Result;
use cashless_client::notices::NoticeKind;
use cashless_client::state::{PaymentForm, Tab, WalletState};
use cashless_client::{ClientConfig, WalletController};
use cashless_core::helpers::dto::PaymentMethod;
use cashless_core::helpers::utils::format_amount;
use commands::{Command, HELP};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_status(state: &WalletState) {
    if let Some(message) = state.error_message() {
        println!("❌ {}", message);
    }
    if let Some(message) = state.success_message() {
        println!("✅ {}", message);
    }

    match state.user() {
        Some(user) => println!("[{}] balance {}", user.name, format_amount(user.balance)),
        None => println!("[not logged in]"),
    }
}

fn print_history(state: &WalletState) {
    let Some(user) = state.user() else {
        return;
    };

    if state.transactions.is_empty() {
        println!("No transactions yet.");
        return;
    }

    for tx in &state.transactions {
        let (sign, other) = if tx.is_incoming(&user.id) {
            ("+", &tx.from_name)
        } else {
            ("-", &tx.to_name)
        };
        println!(
            "{}  {:<9} {}{:>12}  {}  {}",
            tx.timestamp.format("%Y-%m-%d %H:%M"),
            format!("{:?}", tx.kind).to_lowercase(),
            sign,
            format_amount(tx.amount),
            other,
            tx.description.as_deref().unwrap_or("")
        );
    }
}

/// Returns `false` when the session should end.
async fn run_command(controller: &WalletController, command: Command) -> Result<bool> {
    match command {
        Command::Help => println!("{}", HELP),
        Command::Health => match controller.check_health().await {
            Ok(message) => println!("🟢 {}", message),
            Err(e) => println!("🔴 {}", e),
        },
        Command::Login { email, password } => {
            let _ = controller.login(&email, &password).await;
        }
        Command::Register {
            email,
            password,
            name,
        } => {
            let _ = controller.register(&name, &email, &password).await;
        }
        Command::Logout => controller.logout().await,
        Command::Profile => {
            let _ = controller.fetch_profile().await;
        }
        Command::Tab(tab) => {
            controller.set_tab(tab).await;
            if tab == Tab::Transactions {
                print_history(&controller.snapshot().await);
            }
        }
        Command::Recharge(amount) => {
            controller.set_recharge_amount(amount).await;
            let _ = controller.submit_recharge().await;
        }
        Command::Search(query) => {
            let results = controller.search_users(&query).await;
            for (i, user) in results.iter().enumerate() {
                println!("{}. {} <{}>", i + 1, user.name, user.email);
            }
        }
        Command::Select(n) => {
            let results = controller.snapshot().await.search_results;
            match n.checked_sub(1).and_then(|i| results.get(i)) {
                Some(user) => {
                    controller.select_recipient(user).await;
                    println!("Recipient: {}", user.name);
                }
                None => {
                    controller
                        .notify(NoticeKind::Error, format!("No search result #{}", n))
                        .await
                }
            }
        }
        Command::Recipient(user_id) => {
            let form = controller.snapshot().await.payment_form;
            controller
                .update_payment_form(PaymentForm {
                    to_user: user_id,
                    to_name: String::new(),
                    method: PaymentMethod::Transfer,
                    ..form
                })
                .await;
        }
        Command::Scan(payload) => {
            if let Some(tag) = controller.accept_scanned_code(&payload).await {
                println!("Recipient: {}", tag.user_name);
            }
        }
        Command::NfcId(id) => {
            let _ = controller.resolve_nfc_id(&id).await;
        }
        Command::Pay {
            amount,
            description,
        } => {
            let form = controller.snapshot().await.payment_form;
            controller
                .update_payment_form(PaymentForm {
                    amount,
                    description,
                    ..form
                })
                .await;
            let _ = controller.submit_payment().await;
        }
        Command::Qr => {
            if let Ok(qr) = controller.generate_qr().await {
                println!("QR payload: {}", qr.qr_data);
                match qr.png_bytes() {
                    Ok(png) => println!("QR image: {} bytes of PNG", png.len()),
                    Err(e) => log::warn!("QR image is not valid base64: {}", e),
                }
            }
        }
        Command::History => {
            if controller.fetch_transactions().await.is_ok() {
                print_history(&controller.snapshot().await);
            }
        }
        Command::State => {
            println!("{}", serde_json::to_string_pretty(&controller.snapshot().await)?);
        }
        Command::Quit => return Ok(false),
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env();
    log::info!("Starting cashless client against {}", config.api_url);

    let controller = WalletController::from_config(&config)?;
    controller.initialize().await?;

    println!("💳 Cashless wallet. Type 'help' for commands.");
    print_status(&controller.snapshot().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if !run_command(&controller, command).await? {
                    break;
                }
            }
            Err(message) => controller.notify(NoticeKind::Error, message).await,
        }

        print_status(&controller.snapshot().await);
    }

    Ok(())
}
