//! Operator login into both applications, and the deployment marker the
//! CRM sequence later reads.

use crate::config::{Config, Credential};
use crate::error::SyncError;
use crate::features::{CrmFeature, ShopFeature, CRM_TAB, SHOP_TAB};
use produktsync::{Selector, Session};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{error, info, warn};

/// Which CRM installation the session is logged into. The CRM renders its
/// side menu differently per installation, so the shop-export entry sits
/// at a different position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deployment {
    Christine,
    #[default]
    NoiHamburg,
}

impl Deployment {
    pub fn from_account(account: &str) -> Self {
        if account.to_lowercase().contains("christine") {
            Deployment::Christine
        } else {
            Deployment::NoiHamburg
        }
    }

    /// Read the marker written at login. Without one the default
    /// installation is assumed.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_account(content.trim()),
            Err(_) => {
                warn!(
                    "no login marker at {}; assuming the default installation",
                    path.display()
                );
                Deployment::default()
            }
        }
    }

    /// Side-menu entry of the shop-export section for this installation.
    pub fn shop_menu_selector(self) -> Selector {
        match self {
            Deployment::Christine => Selector::Id("list_element_20".into()),
            Deployment::NoiHamburg => Selector::Id("list_element_26".into()),
        }
    }
}

pub fn write_marker(path: &Path, account: &str) -> Result<(), SyncError> {
    fs::write(path, format!("{account}\n"))?;
    Ok(())
}

pub struct LogIn<'a> {
    session: &'a Session,
    config: &'a Config,
}

impl<'a> LogIn<'a> {
    pub fn new(session: &'a Session, config: &'a Config) -> Self {
        Self { session, config }
    }

    /// Numbered pick from a credential map on stdin.
    fn pick_account(
        label: &str,
        accounts: &BTreeMap<String, Credential>,
    ) -> Result<(String, Credential), SyncError> {
        if accounts.is_empty() {
            return Err(SyncError::Config(format!(
                "no {label} accounts configured"
            )));
        }
        println!("Available {label} accounts:");
        let entries: Vec<_> = accounts.iter().collect();
        for (index, (name, _)) in entries.iter().enumerate() {
            println!("{}: {name}", index + 1);
        }
        print!("Pick a {label} account: ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        let picked: usize = line
            .trim()
            .parse()
            .map_err(|_| SyncError::Config(format!("not a number: {:?}", line.trim())))?;
        let (name, credential) = entries
            .get(picked.saturating_sub(1))
            .ok_or_else(|| SyncError::Config(format!("no {label} account #{picked}")))?;
        Ok(((*name).clone(), (*credential).clone()))
    }

    async fn soft_fill(&self, selector: Selector, value: &str, what: &str) {
        let result = async {
            self.session
                .locator(selector)
                .timeout(10)
                .present()
                .await?
                .fill(value)
                .await
        }
        .await;
        match result {
            Ok(()) => info!("{what} set"),
            Err(e) => error!("{what} could not be set: {e}"),
        }
    }

    async fn soft_click(&self, selector: Selector, what: &str) {
        let result = async {
            self.session
                .locator(selector)
                .timeout(10)
                .clickable()
                .await?
                .click()
                .await
        }
        .await;
        match result {
            Ok(()) => info!("{what} clicked"),
            Err(e) => error!("{what} could not be clicked: {e}"),
        }
    }

    pub async fn log_in_shop(&self, credential: &Credential) -> Result<(), SyncError> {
        info!("logging into the Shop");
        let mut nav = self.session.navigator();
        nav.switch_to_tab(SHOP_TAB).await?;
        nav.reset_to_top().await?;
        self.soft_fill(
            ShopFeature::LoginUser.selector(),
            &credential.username,
            "Shop username field",
        )
        .await;
        self.soft_fill(
            ShopFeature::LoginPassword.selector(),
            &credential.password,
            "Shop password field",
        )
        .await;
        self.soft_click(ShopFeature::LoginSubmit.selector(), "Shop login control")
            .await;
        Ok(())
    }

    pub async fn log_in_crm(&self, credential: &Credential) -> Result<(), SyncError> {
        info!("logging into the CRM");
        let mut nav = self.session.navigator();
        nav.switch_to_tab(CRM_TAB).await?;
        nav.descend(&[CrmFeature::LoginFrame.selector()], 10).await?;
        self.soft_fill(
            CrmFeature::LoginUser.selector(),
            &credential.username,
            "CRM username field",
        )
        .await;
        self.soft_fill(
            CrmFeature::LoginPassword.selector(),
            &credential.password,
            "CRM password field",
        )
        .await;
        self.soft_click(CrmFeature::LoginSubmit.selector(), "CRM login control")
            .await;
        Ok(())
    }

    /// Shop first, then CRM; the chosen CRM account is remembered so later
    /// stages (and later processes) know which installation they drive.
    pub async fn run(&self) -> Result<Deployment, SyncError> {
        let (_, shop_credential) = Self::pick_account("Shopware", &self.config.shopware)?;
        self.log_in_shop(&shop_credential).await?;
        let (crm_account, crm_credential) = Self::pick_account("Tricoma", &self.config.tricoma)?;
        self.log_in_crm(&crm_credential).await?;
        write_marker(&self.config.login_marker_file, &crm_account)?;
        Ok(Deployment::from_account(&crm_account))
    }
}
