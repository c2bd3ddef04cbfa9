//! Update sequence against the Shop admin.
//!
//! The Shop is a single-page admin; there are no frames, only section
//! tabs and overlay widgets. The one hard precondition is the article
//! number — without it the product cannot be found and nothing below can
//! run. Everything past the search degrades per-widget: a control that
//! cannot be driven is logged and skipped.

use crate::error::SyncError;
use crate::features::{self, ShopFeature, SHOP_TAB};
use crate::pricing;
use crate::record::ProductRecord;
use produktsync::driver::wire;
use produktsync::{AutomationError, Locator, Navigator, Selector, Session, WebElement};
use serde_json::Value;
use tracing::{debug, error, info, warn};

const DEALER_RULE: &str = "Händler";
const DEALER_FOREIGN_RULE: &str = "Händler Ausland";
const PRICING_GROUPS: [&str; 2] = [DEALER_RULE, DEALER_FOREIGN_RULE];
const TARGET_MANUFACTURER: &str = "Scherer Voigt GbR";
/// Positional entries of the sales-channel dropdown that make up the
/// fixed channel set.
const CHANNEL_SLOTS: [usize; 4] = [0, 1, 2, 3];

/// Section tabs of the product detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductTab {
    General,
    AdvancedPricing,
}

impl ProductTab {
    fn selector(self) -> Selector {
        match self {
            ProductTab::General => ShopFeature::TabGeneral.selector(),
            ProductTab::AdvancedPricing => ShopFeature::TabAdvancedPricing.selector(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ProductTab::General => "general",
            ProductTab::AdvancedPricing => "advanced pricing",
        }
    }
}

/// One pass of the language loop. German comes last and only switches the
/// admin back; it never writes content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagePass {
    English,
    French,
    German,
}

impl LanguagePass {
    fn writes_content(self) -> bool {
        !matches!(self, LanguagePass::German)
    }

    fn option_selector(self) -> Selector {
        match self {
            LanguagePass::English => features::language_option("English"),
            LanguagePass::French => features::language_option("Français"),
            // German is always the first switcher entry; matched by position.
            LanguagePass::German => ShopFeature::GermanLanguageOption.selector(),
        }
    }
}

pub struct ShopUploader {
    session: Session,
    nav: Navigator,
}

impl ShopUploader {
    pub fn new(session: Session) -> Self {
        let nav = session.navigator();
        Self { session, nav }
    }

    fn locate(&self, feature: ShopFeature) -> Locator {
        self.session.locator(feature.selector())
    }

    pub async fn switch_to_shop(&mut self) -> Result<(), SyncError> {
        self.nav.switch_to_tab(SHOP_TAB).await?;
        Ok(())
    }

    /// Search the product by article number and open its detail page.
    /// Fatal when the record has no identifier or no result link appears.
    pub async fn search_product(&mut self, record: &ProductRecord) -> Result<(), SyncError> {
        let artikelnummer = record.identifier().ok_or(SyncError::MissingIdentifier)?;
        let input = self
            .locate(ShopFeature::SearchInput)
            .timeout(20)
            .visible()
            .await?;
        input.fill(artikelnummer).await.map_err(SyncError::from)?;
        info!("searching the Shop for {artikelnummer:?}");
        // Give the results dropdown a moment to populate.
        tokio::time::sleep(self.session.clock().tick).await;
        let link = self
            .session
            .locator(features::shop_search_result(artikelnummer))
            .timeout(20)
            .clickable()
            .await?;
        let _ = link.scroll_into_view().await;
        link.js_click().await?;
        info!("opened the search result for {artikelnummer:?}");
        Ok(())
    }

    pub async fn open_product(&mut self, record: &ProductRecord) -> Result<(), SyncError> {
        self.switch_to_shop().await?;
        self.search_product(record).await
    }

    pub async fn run(&mut self, record: &ProductRecord) -> Result<(), SyncError> {
        self.switch_to_shop().await?;
        self.open_tab(ProductTab::AdvancedPricing).await;
        self.remove_existing_rules().await;
        self.select_conditional_rule(DEALER_RULE).await;
        self.add_pricing_rule().await;
        self.select_rule_in_new_card(DEALER_FOREIGN_RULE).await;
        self.fill_dealer_net_prices(record).await;
        self.open_tab(ProductTab::General).await;
        self.update_manufacturer().await;
        self.write_gross_price(record).await?;
        self.update_purchase_grid(record).await;
        self.update_sales_channels().await;
        for pass in [
            LanguagePass::English,
            LanguagePass::French,
            LanguagePass::German,
        ] {
            self.change_language(pass).await;
            if pass.writes_content() {
                self.write_translated_text(record, pass).await;
            }
        }
        Ok(())
    }

    async fn open_tab(&self, tab: ProductTab) {
        let result = async {
            let element = self
                .session
                .locator(tab.selector())
                .timeout(20)
                .clickable()
                .await?;
            let _ = element.scroll_into_view().await;
            element.js_click().await
        }
        .await;
        match result {
            Ok(()) => info!("switched to the {} section", tab.name()),
            Err(e) => error!("could not open the {} section: {e}", tab.name()),
        }
    }

    /// Remove every pre-existing price-rule card. The card list shifts
    /// after each deletion, so the delete controls are re-queried every
    /// round instead of cached.
    async fn remove_existing_rules(&self) {
        let initial = match self
            .locate(ShopFeature::DeleteRuleButton)
            .timeout(3)
            .wait_all()
            .await
        {
            Ok(buttons) => buttons.len(),
            Err(_) => {
                info!("no pricing rules to remove");
                return;
            }
        };
        info!("removing {initial} existing pricing rules");
        for round in 0..initial {
            let buttons = match self.locate(ShopFeature::DeleteRuleButton).all().await {
                Ok(buttons) => buttons,
                Err(e) => {
                    error!("delete-rule controls could not be re-queried: {e}");
                    return;
                }
            };
            let Some(button) = buttons.first() else {
                break;
            };
            let _ = button.scroll_into_view().await;
            if let Err(e) = button.js_click().await {
                error!("delete-rule control could not be clicked: {e}");
                return;
            }
            debug!("removed pricing rule {}/{initial}", round + 1);
            tokio::time::sleep(self.session.clock().tick / 2).await;
        }
    }

    /// Pick the named rule from the empty-state picker.
    async fn select_conditional_rule(&self, rule: &str) {
        let result = async {
            let picker = self
                .locate(ShopFeature::EmptyStateRulePicker)
                .timeout(20)
                .clickable()
                .await?;
            let _ = picker.scroll_into_view().await;
            picker.js_click().await?;
            self.session
                .locator(features::rule_option(rule))
                .timeout(20)
                .clickable()
                .await?
                .click()
                .await
        }
        .await;
        match result {
            Ok(()) => info!("selected conditional rule {rule:?}"),
            Err(e) => error!("conditional rule {rule:?} could not be selected: {e}"),
        }
    }

    async fn add_pricing_rule(&self) {
        let result = async {
            let button = self
                .locate(ShopFeature::AddPricingRule)
                .timeout(20)
                .clickable()
                .await?;
            let _ = button.scroll_into_view().await;
            button.js_click().await
        }
        .await;
        match result {
            Ok(()) => info!("added a second pricing rule card"),
            Err(e) => error!("pricing rule card could not be added: {e}"),
        }
    }

    async fn select_rule_in_new_card(&self, rule: &str) {
        let result = async {
            self.locate(ShopFeature::NewCardRuleInput)
                .timeout(20)
                .clickable()
                .await?
                .click()
                .await?;
            self.session
                .locator(features::rule_option(rule))
                .timeout(20)
                .clickable()
                .await?
                .click()
                .await
        }
        .await;
        match result {
            Ok(()) => info!("selected rule {rule:?} in the new card"),
            Err(e) => error!("rule {rule:?} could not be selected in the new card: {e}"),
        }
    }

    /// Overwrite the dealer net price in every tier the Shop pre-populated.
    /// Inputs without an existing value are placeholders and stay empty.
    async fn fill_dealer_net_prices(&self, record: &ProductRecord) {
        let Some(price) = record
            .handler_preis
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        else {
            error!("record carries no dealer price; net price tiers left untouched");
            return;
        };
        let inputs = match self
            .locate(ShopFeature::NetPriceInputs)
            .timeout(20)
            .wait_all()
            .await
        {
            Ok(inputs) => inputs,
            Err(e) => {
                error!("net price inputs not found: {e}");
                return;
            }
        };
        info!("found {} net price inputs", inputs.len());
        for input in &inputs {
            match input.value().await {
                Ok(Some(current)) if !current.trim().is_empty() => {
                    match input.fill(price).await {
                        Ok(()) => info!("net price {current:?} overwritten with {price:?}"),
                        Err(e) => error!("net price input could not be filled: {e}"),
                    }
                }
                Ok(_) => debug!("skipped a net price input with no existing value"),
                Err(e) => error!("net price input could not be read: {e}"),
            }
        }
    }

    /// Set the manufacturer unless the field already shows the target.
    async fn update_manufacturer(&self) {
        let result = async {
            let field = self
                .locate(ShopFeature::ManufacturerField)
                .timeout(20)
                .visible()
                .await?;
            let selection = self
                .locate(ShopFeature::SingleSelectSelection)
                .within(&field)
                .first()
                .await?;
            let current = self
                .locate(ShopFeature::SingleSelectText)
                .within(&selection)
                .first()
                .await?
                .text()
                .await?;
            if current.trim() == TARGET_MANUFACTURER {
                info!("manufacturer already set to {TARGET_MANUFACTURER:?}");
                return Ok(());
            }
            let _ = selection.scroll_into_view().await;
            selection.js_click().await?;
            let content = self
                .locate(ShopFeature::ResultListContent)
                .timeout(20)
                .visible()
                .await?;
            let list = self
                .locate(ShopFeature::ResultListItems)
                .within(&content)
                .first()
                .await?;
            let option = self
                .locate(ShopFeature::FirstResultOption)
                .within(&list)
                .timeout(10)
                .clickable()
                .await?;
            let _ = option.scroll_into_view().await;
            option.js_click().await?;
            info!("manufacturer set to {TARGET_MANUFACTURER:?}");
            Ok::<(), AutomationError>(())
        }
        .await;
        if let Err(e) = result {
            error!("manufacturer selection failed: {e}");
        }
    }

    /// Derive the gross price from the end-customer net price and write
    /// it. A malformed price string aborts the pipeline; a missing one is
    /// only logged, so an incomplete extraction cannot zero the price.
    async fn write_gross_price(&self, record: &ProductRecord) -> Result<(), SyncError> {
        let Some(raw) = record
            .endkunde_preis
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        else {
            error!("record carries no end-customer price; gross price left untouched");
            return Ok(());
        };
        let adjusted = pricing::retail_gross(raw)?;
        info!(
            "gross price {} derived from net {raw}",
            pricing::format_price(adjusted)
        );
        let written = async {
            self.locate(ShopFeature::GrossPriceField)
                .timeout(20)
                .visible()
                .await?
                .fill(&pricing::format_price(adjusted))
                .await
        }
        .await;
        match written {
            Ok(()) => info!("gross price written"),
            Err(e) => error!("gross price field could not be filled: {e}"),
        }
        Ok(())
    }

    /// Set minimum purchase and scaling to the packaging unit for both
    /// pricing tiers. The grid renders read-only text until a cell is
    /// double-clicked into edit mode.
    async fn update_purchase_grid(&self, record: &ProductRecord) {
        let value = record
            .verpackungseinheit
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "1".to_string());
        for group in PRICING_GROUPS {
            if let Err(e) = self.edit_grid_row(group, &value).await {
                error!("grid row for {group:?} could not be updated: {e}");
            }
        }
    }

    async fn edit_grid_row(&self, group: &str, value: &str) -> Result<(), AutomationError> {
        let row = self
            .session
            .locator(features::grid_row(group))
            .timeout(20)
            .present()
            .await?;
        let cells = [
            (
                ShopFeature::MinPurchaseCell,
                ShopFeature::MinPurchaseInput,
                "minimum purchase",
            ),
            (ShopFeature::ScalingCell, ShopFeature::ScalingInput, "scaling"),
        ];
        for (cell_feature, input_feature, label) in cells {
            let cell = self.locate(cell_feature).within(&row).first().await?;
            let _ = cell.scroll_into_view().await;
            cell.double_click().await?;
            let input = self
                .locate(input_feature)
                .within(&cell)
                .timeout(10)
                .visible()
                .await?;
            input.fill(value).await?;
            info!("{label} for {group:?} set to {value}");
        }
        Ok(())
    }

    /// Clear the sales-channel selection chip by chip, then re-assign the
    /// fixed channel set from the expanded dropdown.
    async fn update_sales_channels(&self) {
        let result = async {
            let container = self
                .locate(ShopFeature::VisibilityField)
                .timeout(20)
                .visible()
                .await?;
            self.clear_channel_chips(&container).await?;

            let expand = self
                .locate(ShopFeature::ExpandIndicator)
                .within(&container)
                .first()
                .await?;
            let _ = expand.scroll_into_view().await;
            expand.js_click().await?;
            let content = self
                .locate(ShopFeature::ResultListContent)
                .timeout(20)
                .visible()
                .await?;
            let list = self
                .locate(ShopFeature::ResultListItems)
                .within(&content)
                .first()
                .await?;
            for slot in CHANNEL_SLOTS {
                let option = self
                    .session
                    .locator(features::channel_option(slot))
                    .within(&list)
                    .timeout(10)
                    .clickable()
                    .await?;
                let _ = option.scroll_into_view().await;
                option.js_click().await?;
                debug!("assigned sales channel slot {slot}");
                tokio::time::sleep(self.session.clock().tick / 5).await;
            }
            Ok::<(), AutomationError>(())
        }
        .await;
        match result {
            Ok(()) => info!("sales channels re-assigned"),
            Err(e) => error!("sales channel assignment failed: {e}"),
        }
    }

    /// The multi-select has no bulk clear; chips are removed one at a
    /// time and re-queried after each removal.
    async fn clear_channel_chips(&self, container: &WebElement) -> Result<(), AutomationError> {
        let mut last_count = usize::MAX;
        loop {
            let chips = self
                .locate(ShopFeature::SelectedChannelChip)
                .within(container)
                .all()
                .await?;
            if chips.is_empty() {
                break;
            }
            if chips.len() >= last_count {
                warn!(
                    "sales channel chips are not shrinking; giving up with {} left",
                    chips.len()
                );
                break;
            }
            last_count = chips.len();
            let dismiss = self
                .locate(ShopFeature::ChipDismiss)
                .within(&chips[0])
                .first()
                .await?;
            let _ = dismiss.scroll_into_view().await;
            dismiss.click().await?;
            debug!("removed a sales channel chip");
            tokio::time::sleep(self.session.clock().tick / 5).await;
        }
        info!("sales channel selection cleared");
        Ok(())
    }

    /// Switch the admin language, confirming the unsaved-changes modal if
    /// one appears (its absence is normal).
    async fn change_language(&self, pass: LanguagePass) {
        let switched = async {
            let switch = self
                .locate(ShopFeature::LanguageSwitch)
                .timeout(20)
                .clickable()
                .await?;
            let _ = switch.scroll_into_view().await;
            switch.js_click().await?;
            let option = self
                .session
                .locator(pass.option_selector())
                .timeout(10)
                .clickable()
                .await?;
            let _ = option.scroll_into_view().await;
            option.js_click().await
        }
        .await;
        match switched {
            Ok(()) => info!("switched the admin language to {pass:?}"),
            Err(e) => {
                error!("language switch to {pass:?} failed: {e}");
                return;
            }
        }
        match self
            .locate(ShopFeature::SaveModalButton)
            .timeout(5)
            .clickable()
            .await
        {
            Ok(button) => match button.js_click().await {
                Ok(()) => info!("confirmed the unsaved-changes modal"),
                Err(e) => error!("unsaved-changes modal could not be confirmed: {e}"),
            },
            Err(_) => debug!("no unsaved-changes modal appeared"),
        }
    }

    /// Write the localized name and inject the translated description via
    /// the embedded code editor, toggling raw-markup mode only when it is
    /// not already active.
    async fn write_translated_text(&self, record: &ProductRecord, pass: LanguagePass) {
        let (name, description) = match pass {
            LanguagePass::English => (record.titel_gbr.clone(), record.beschreibung_en.clone()),
            LanguagePass::French => (record.titel_fra.clone(), record.beschreibung_fr.clone()),
            LanguagePass::German => return,
        };
        let result = async {
            let field = self
                .locate(ShopFeature::ProductNameField)
                .timeout(20)
                .visible()
                .await?;
            field.fill(&name.unwrap_or_default()).await?;

            let toggle = self
                .locate(ShopFeature::CodeToggle)
                .timeout(20)
                .clickable()
                .await?;
            let class = toggle.attribute("class").await?.unwrap_or_default();
            if !class.contains("is--active") {
                toggle.js_click().await?;
                debug!("editor switched to raw-markup mode");
            }
            let editor = self
                .locate(ShopFeature::CodeEditor)
                .timeout(20)
                .present()
                .await?;
            self.session
                .execute_script(
                    "ace.edit(arguments[0]).setValue(arguments[1]);",
                    vec![
                        wire::element_arg(editor.reference()),
                        Value::String(description.unwrap_or_default()),
                    ],
                )
                .await?;
            Ok::<(), AutomationError>(())
        }
        .await;
        match result {
            Ok(()) => info!("localized name and description written for {pass:?}"),
            Err(e) => error!("localized content for {pass:?} could not be written: {e}"),
        }
    }
}
