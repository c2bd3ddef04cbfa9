//! Extraction sequence against the CRM.
//!
//! Field-level steps are fault-isolated: a step that cannot locate its
//! target logs the failure and leaves the field absent. Navigational
//! checkpoints (frames, the pricing section, the import confirmation) are
//! fatal and abort the product's pipeline.

use crate::error::SyncError;
use crate::features::{self, CrmFeature, CRM_TAB};
use crate::html;
use crate::login::Deployment;
use crate::record::ProductRecord;
use produktsync::driver::wire;
use produktsync::{AutomationError, Locator, Navigator, Session, WebElement};
use tracing::{error, info, warn};

/// Fixed option value of the product-kind dropdown.
const PRODUCT_KIND_OPTION: &str = "124";
/// WebDriver keycode for Enter.
const ENTER_KEY: &str = "\u{e007}";

pub struct CrmDownloader {
    session: Session,
    nav: Navigator,
    deployment: Deployment,
}

impl CrmDownloader {
    pub fn new(session: Session, deployment: Deployment) -> Self {
        let nav = session.navigator();
        Self {
            session,
            nav,
            deployment,
        }
    }

    fn locate(&self, feature: CrmFeature) -> Locator {
        self.session.locator(feature.selector())
    }

    /// Bring a product up in the CRM by name (batch mode drives this
    /// before the extraction proper).
    pub async fn open_product(&mut self, product: &str) -> Result<(), SyncError> {
        info!("searching the CRM for {product:?}");
        self.nav.switch_to_tab(CRM_TAB).await?;
        self.enter_product_frame().await?;
        let search = self
            .locate(CrmFeature::ProductSearchField)
            .timeout(10)
            .present()
            .await?;
        search.fill(product).await.map_err(SyncError::from)?;
        search.type_text(ENTER_KEY).await.map_err(SyncError::from)?;
        let result = self
            .session
            .locator(features::crm_search_result(product))
            .timeout(10)
            .clickable()
            .await?;
        let _ = result.scroll_into_view().await;
        result.js_click().await?;
        Ok(())
    }

    pub async fn run(&mut self) -> Result<ProductRecord, SyncError> {
        self.nav.switch_to_tab(CRM_TAB).await?;
        self.enter_product_frame().await?;
        self.wait_for_product_page().await?;
        self.apply_product_defaults().await;
        self.click_save().await;
        let mut record = self.read_product_details().await;
        self.read_localized_titles(&mut record).await?;
        self.open_other_prices().await?;
        self.read_prices(&mut record).await?;
        self.open_shop_export().await?;
        self.ensure_imported().await?;
        self.back_to_product_data().await?;
        Ok(record)
    }

    async fn enter_product_frame(&mut self) -> Result<(), SyncError> {
        self.nav
            .descend(&[CrmFeature::ProductFrame.selector()], 10)
            .await?;
        Ok(())
    }

    /// The product frame can take a long time to initialize after a prior
    /// navigation.
    async fn wait_for_product_page(&mut self) -> Result<(), SyncError> {
        info!("waiting for the product page to render");
        self.locate(CrmFeature::ArticleNumber)
            .timeout(30)
            .present()
            .await?;
        Ok(())
    }

    /// Idempotent defaults, re-applied on every pass regardless of the
    /// current values.
    async fn apply_product_defaults(&self) {
        if let Err(e) = self.fill_feature(CrmFeature::UnitOfMeasure, "Stck").await {
            error!("unit-of-measure field could not be set: {e}");
        }
        if let Err(e) = self.fill_feature(CrmFeature::QuantityFront, "1").await {
            error!("quantity field could not be set: {e}");
        }
        if let Err(e) = self.select_product_kind().await {
            error!("product-kind dropdown could not be set: {e}");
        }
    }

    async fn fill_feature(
        &self,
        feature: CrmFeature,
        value: &str,
    ) -> Result<(), AutomationError> {
        let field = self.locate(feature).timeout(10).present().await?;
        field.fill(value).await
    }

    async fn select_product_kind(&self) -> Result<(), AutomationError> {
        let dropdown = self
            .locate(CrmFeature::ProductKind)
            .timeout(10)
            .present()
            .await?;
        dropdown.select_value(PRODUCT_KIND_OPTION).await
    }

    /// An already-saved page may not render the control; tolerated.
    async fn click_save(&self) {
        let result = async {
            self.locate(CrmFeature::SaveButton)
                .timeout(10)
                .clickable()
                .await?
                .click()
                .await
        }
        .await;
        match result {
            Ok(()) => info!("save control clicked"),
            Err(e) => error!("save control could not be clicked: {e}"),
        }
    }

    async fn read_product_details(&mut self) -> ProductRecord {
        let mut record = ProductRecord::default();

        // The save step may have triggered a partial reload, so the
        // identifier is re-resolved instead of reusing the old handle.
        match self
            .locate(CrmFeature::ArticleNumber)
            .timeout(10)
            .fresh(3)
            .await
        {
            Ok(field) => match field.value().await {
                Ok(value) => {
                    info!("article number: {value:?}");
                    record.artikelnummer = value;
                }
                Err(e) => error!("article number could not be read: {e}"),
            },
            Err(e) => error!("article number field could not be resolved: {e}"),
        }

        match self.read_value(CrmFeature::PackagingUnit).await {
            Ok(value) => {
                info!("packaging unit: {value:?}");
                record.verpackungseinheit = value;
            }
            Err(e) => error!("packaging unit could not be read: {e}"),
        }

        match self.read_description().await {
            Ok(beschreibung) => {
                info!("description read ({} bytes)", beschreibung.len());
                record.beschreibung = Some(beschreibung);
            }
            Err(e) => {
                error!("description could not be read: {e}");
                record.beschreibung = Some(String::new());
            }
        }
        record
    }

    async fn read_value(&self, feature: CrmFeature) -> Result<Option<String>, AutomationError> {
        self.locate(feature)
            .timeout(10)
            .present()
            .await?
            .value()
            .await
    }

    /// The description lives in a nested rich-text editor iframe.
    async fn read_description(&mut self) -> Result<String, AutomationError> {
        self.nav
            .enter_frame(CrmFeature::DescriptionFrame.selector(), 10)
            .await?;
        let read = async {
            self.locate(CrmFeature::EditorBody)
                .timeout(10)
                .present()
                .await?
                .inner_html()
                .await
        }
        .await;
        // Leave the editor frame whatever the read's outcome.
        self.nav.exit_to_parent().await?;
        Ok(html::strip_inline_styles(&read?))
    }

    /// Localized titles live in a modal with its own top-level iframe.
    /// Reads are soft; failing to reach the modal at all is fatal. The
    /// close-and-reset cleanup runs unconditionally.
    async fn read_localized_titles(
        &mut self,
        record: &mut ProductRecord,
    ) -> Result<(), SyncError> {
        let opener = async {
            self.locate(CrmFeature::LanguageButton)
                .timeout(10)
                .clickable()
                .await?
                .click()
                .await
        }
        .await;
        if let Err(e) = opener {
            error!("language selection control could not be clicked: {e}");
        }

        self.nav.reset_to_top().await?;
        if let Err(e) = self
            .nav
            .enter_frame(CrmFeature::LanguageFrame.selector(), 10)
            .await
        {
            self.close_language_popup().await;
            return Err(e.into());
        }

        match self.read_value(CrmFeature::TitleFrench).await {
            Ok(value) => {
                info!("French title: {value:?}");
                record.titel_fra = value;
            }
            Err(e) => error!("French title could not be read: {e}"),
        }
        match self.read_value(CrmFeature::TitleEnglish).await {
            Ok(value) => {
                info!("English title: {value:?}");
                record.titel_gbr = value;
            }
            Err(e) => error!("English title could not be read: {e}"),
        }

        self.close_language_popup().await;
        Ok(())
    }

    async fn close_language_popup(&mut self) {
        if let Err(e) = self.nav.reset_to_top().await {
            error!("could not return to the top-level document: {e}");
            return;
        }
        let close = async {
            self.locate(CrmFeature::LanguageClose)
                .timeout(10)
                .clickable()
                .await?
                .js_click()
                .await
        }
        .await;
        match close {
            Ok(()) => info!("language popup closed"),
            Err(e) => error!("language popup could not be closed: {e}"),
        }
        if let Err(e) = self.nav.reset_to_top().await {
            error!("could not return to the top-level document: {e}");
        }
    }

    /// Into the further-prices section and down to the advanced settings.
    async fn open_other_prices(&mut self) -> Result<(), SyncError> {
        self.enter_product_frame().await?;
        let menu = self
            .locate(CrmFeature::OtherPricesMenu)
            .timeout(30)
            .visible()
            .await?;
        let _ = menu.scroll_into_view().await;
        menu.js_click().await?;
        info!("further-prices section opened");

        self.nav
            .enter_frame(CrmFeature::LowerFrame.selector(), 10)
            .await?;
        let link = self
            .locate(CrmFeature::AdvancedPriceLink)
            .timeout(30)
            .visible()
            .await?;
        let _ = link.scroll_into_view().await;
        self.locate(CrmFeature::AdvancedPriceLink)
            .timeout(10)
            .clickable()
            .await?;
        link.js_click().await?;
        info!("advanced price settings opened");
        Ok(())
    }

    /// The pricing table is matched via its header caption; each price is
    /// split across a whole-number input and a fraction input.
    async fn read_prices(&mut self, record: &mut ProductRecord) -> Result<(), SyncError> {
        let read = async {
            let container = self
                .locate(CrmFeature::PriceBox)
                .timeout(10)
                .present()
                .await?;
            let table = self
                .locate(CrmFeature::PriceTable)
                .within(&container)
                .first()
                .await?;

            let handler_preis = self
                .read_split_price(&table, CrmFeature::DealerPriceRow)
                .await?;
            info!("dealer price: {handler_preis}");
            record.handler_preis = Some(handler_preis);

            let endkunde_preis = self
                .read_split_price(&table, CrmFeature::EndCustomerPriceRow)
                .await?;
            info!("end-customer price: {endkunde_preis}");
            record.endkunde_preis = Some(endkunde_preis);
            Ok::<(), AutomationError>(())
        }
        .await;
        self.nav.reset_to_top().await?;
        read.map_err(Into::into)
    }

    async fn read_split_price(
        &self,
        table: &WebElement,
        row: CrmFeature,
    ) -> Result<String, AutomationError> {
        let row = self.locate(row).within(table).first().await?;
        let whole = self
            .locate(CrmFeature::PriceWholeInput)
            .within(&row)
            .first()
            .await?
            .value()
            .await?
            .unwrap_or_default();
        let fraction = self
            .locate(CrmFeature::PriceFractionInput)
            .within(&row)
            .first()
            .await?
            .value()
            .await?
            .unwrap_or_default();
        Ok(format!("{whole}.{fraction}"))
    }

    /// Into the shop-export section; its menu position depends on the
    /// installation the operator logged into.
    async fn open_shop_export(&mut self) -> Result<(), SyncError> {
        self.enter_product_frame().await?;
        let entry = self
            .session
            .locator(self.deployment.shop_menu_selector())
            .timeout(10)
            .clickable()
            .await?;
        let _ = entry.scroll_into_view().await;
        entry.js_click().await?;
        info!("shop-export section opened");
        self.nav
            .enter_frame(CrmFeature::ShopExportFrame.selector(), 10)
            .await?;
        Ok(())
    }

    /// Stage the product for sync and wait for the green confirmation. A
    /// marker in any color means an earlier run already did the work.
    async fn ensure_imported(&mut self) -> Result<(), SyncError> {
        if self
            .locate(CrmFeature::ImportedMarker)
            .timeout(1)
            .present()
            .await
            .is_ok()
        {
            info!("product already imported; skipping the sync controls");
            self.nav.reset_to_top().await?;
            return Ok(());
        }
        info!("product not yet imported; staging it for sync");

        self.locate(CrmFeature::StageSyncButton)
            .timeout(10)
            .clickable()
            .await?
            .click()
            .await?;

        // Some installations auto-run the sync after staging, so the run
        // control may never render.
        let run = async {
            self.locate(CrmFeature::RunSyncButton)
                .timeout(10)
                .clickable()
                .await?
                .click()
                .await
        }
        .await;
        if let Err(e) = run {
            warn!("run-sync control not clicked: {e}");
        }

        self.locate(CrmFeature::ImportedConfirmed)
            .timeout(60)
            .present()
            .await?;
        info!("product imported");
        self.nav.reset_to_top().await?;
        Ok(())
    }

    /// Leave the CRM on the product-data section so the next product
    /// starts from a known place.
    async fn back_to_product_data(&mut self) -> Result<(), SyncError> {
        self.enter_product_frame().await?;
        let clicked = async {
            if let Ok(pane) = self
                .locate(CrmFeature::MenuScrollPane)
                .timeout(10)
                .present()
                .await
            {
                let _ = self
                    .session
                    .execute_script(
                        "arguments[0].scrollTop = 0;",
                        vec![wire::element_arg(pane.reference())],
                    )
                    .await;
            }
            let entry = self
                .locate(CrmFeature::ProductDataMenu)
                .timeout(30)
                .visible()
                .await?;
            let _ = entry.scroll_into_view().await;
            entry.js_click().await
        }
        .await;
        self.nav.reset_to_top().await?;
        clicked.map_err(Into::into)
    }
}
