//! Interactive operator menu.

use crate::facade::ProcessFacade;
use std::io::{self, Write};
use tracing::error;

fn prompt() -> io::Result<String> {
    println!("Choose an operation:");
    println!("1 - Full process (download, translate, upload)");
    println!("2 - Download and translate only");
    println!("3 - Upload only");
    println!("4 - Process the product list from file");
    println!("q - Quit");
    print!("Enter your choice (1/2/3/4/q): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Run one menu round. Returns `false` once the operator quits.
pub async fn execute_choice(facade: &ProcessFacade) -> bool {
    let choice = match prompt() {
        Ok(choice) => choice,
        Err(e) => {
            error!("could not read the menu choice: {e}");
            return false;
        }
    };
    let result = match choice.as_str() {
        // Enter defaults to the full process, like the operators expect.
        "1" | "" => facade.run_full_process().await,
        "2" => async {
            facade.run_download_process().await?;
            facade.run_translate_process().await?;
            facade.go_to_shop().await
        }
        .await,
        "3" => facade.run_upload_process().await,
        "4" => facade.run_batch_process().await.map(|_| ()),
        "q" | "Q" => return false,
        other => {
            error!("invalid choice: {other:?}");
            return true;
        }
    };
    if let Err(e) = result {
        error!("operation failed: {e}");
    }
    true
}
