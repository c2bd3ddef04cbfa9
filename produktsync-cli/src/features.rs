//! Declarative selector tables for the two target applications.
//!
//! Every third-party selector lives here, one table entry per UI feature,
//! so a markup change in either application is a one-line fix. The
//! sequences only ever name features, never raw selectors.

use produktsync::Selector;

/// Tab order inside the shared browser window.
pub const CRM_TAB: usize = 0;
pub const SHOP_TAB: usize = 1;

/// Features of the CRM (Tricoma) UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmFeature {
    /// Top-level iframe hosting the product module.
    ProductFrame,
    /// Iframe hosting the login form.
    LoginFrame,
    LoginUser,
    LoginPassword,
    LoginSubmit,
    /// Article number field; doubles as the page-ready marker.
    ArticleNumber,
    UnitOfMeasure,
    QuantityFront,
    ProductKind,
    SaveButton,
    PackagingUnit,
    /// Nested rich-text editor iframe carrying the description.
    DescriptionFrame,
    EditorBody,
    /// Opens the localized-titles modal.
    LanguageButton,
    /// Iframe of the localized-titles modal.
    LanguageFrame,
    TitleFrench,
    TitleEnglish,
    LanguageClose,
    /// Side menu entry for the further-prices section.
    OtherPricesMenu,
    /// Side menu entry back to the product-data section.
    ProductDataMenu,
    MenuScrollPane,
    /// Lower content iframe inside the product frame.
    LowerFrame,
    /// Lower content iframe once the shop-export section is open.
    ShopExportFrame,
    AdvancedPriceLink,
    /// Pricing box matched by its header caption.
    PriceBox,
    PriceTable,
    DealerPriceRow,
    EndCustomerPriceRow,
    PriceWholeInput,
    PriceFractionInput,
    /// Any "importiert" marker, regardless of color.
    ImportedMarker,
    /// The green success rendition of the marker.
    ImportedConfirmed,
    StageSyncButton,
    RunSyncButton,
    ProductSearchField,
}

impl CrmFeature {
    pub fn selector(self) -> Selector {
        match self {
            CrmFeature::ProductFrame => Selector::Id("contentframeprodukte".into()),
            CrmFeature::LoginFrame => Selector::Id("contentframe".into()),
            CrmFeature::LoginUser => Selector::Id("benutzer".into()),
            CrmFeature::LoginPassword => Selector::Id("passwort".into()),
            CrmFeature::LoginSubmit => Selector::Css("input.login[name='submitbuton']".into()),
            CrmFeature::ArticleNumber => Selector::XPath("//*[@id='feld44']".into()),
            CrmFeature::UnitOfMeasure => Selector::Id("feld93".into()),
            CrmFeature::QuantityFront => Selector::Id("feld94_vorne".into()),
            CrmFeature::ProductKind => Selector::Name("feld99".into()),
            CrmFeature::SaveButton => {
                Selector::Css("input.Buttonspeichern[name='feldspeichern']".into())
            }
            CrmFeature::PackagingUnit => Selector::Id("feld82_vorne".into()),
            CrmFeature::DescriptionFrame => Selector::Id("tri_editor_feld42_ifr".into()),
            CrmFeature::EditorBody => Selector::Tag("body".into()),
            CrmFeature::LanguageButton => Selector::XPath("//img[@alt='Sprachwahl']".into()),
            CrmFeature::LanguageFrame => Selector::Id("contentframeSprache".into()),
            CrmFeature::TitleFrench => Selector::Name("titel_FRA".into()),
            CrmFeature::TitleEnglish => Selector::Name("titel_GBR".into()),
            CrmFeature::LanguageClose => {
                Selector::Css("div#window_Sprache img.window_close".into())
            }
            CrmFeature::OtherPricesMenu => Selector::Id("list_element_8".into()),
            CrmFeature::ProductDataMenu => Selector::Id("list_element_2".into()),
            CrmFeature::MenuScrollPane => Selector::Css("td.menu_bg".into()),
            CrmFeature::LowerFrame => Selector::Id("frameunten".into()),
            CrmFeature::ShopExportFrame => Selector::XPath(
                "//iframe[@id='frameunten' and contains(@src, 'shopwaresechs')]".into(),
            ),
            CrmFeature::AdvancedPriceLink => Selector::XPath(
                "//a[contains(@href, 'auswahl=preise') and contains(., 'Erweiterte Preiseinstellungen')]"
                    .into(),
            ),
            CrmFeature::PriceBox => Selector::XPath(
                "//div[@class='tri_box'][p[contains(., 'Weitere Verkaufspreise (€)')]]".into(),
            ),
            CrmFeature::PriceTable => Selector::XPath(
                ".//div[@class='content']//table[contains(@class, 'table_listing')]".into(),
            ),
            CrmFeature::DealerPriceRow => {
                Selector::XPath(".//tr[td[contains(., 'Händler (H)')]]".into())
            }
            CrmFeature::EndCustomerPriceRow => {
                Selector::XPath(".//tr[td[contains(., 'Endkunden (EK)')]]".into())
            }
            CrmFeature::PriceWholeInput => {
                Selector::XPath(".//input[contains(@class, 'zahlenfeld_vorkomma')]".into())
            }
            CrmFeature::PriceFractionInput => {
                Selector::XPath(".//input[contains(@class, 'zahlenfeld_nachkomma')]".into())
            }
            CrmFeature::ImportedMarker => {
                Selector::XPath("//*[contains(text(), 'importiert')]".into())
            }
            CrmFeature::ImportedConfirmed => Selector::XPath(
                "//*[contains(text(), 'importiert') and contains(@style, 'color: green')]".into(),
            ),
            CrmFeature::StageSyncButton => Selector::Name("produktabgleich_vormerken".into()),
            CrmFeature::RunSyncButton => Selector::Name("produktabgleich_durchfuehren".into()),
            CrmFeature::ProductSearchField => Selector::Name("suchbegriff".into()),
        }
    }
}

/// A product link in the CRM search results, matched by its visible name.
pub fn crm_search_result(product: &str) -> Selector {
    Selector::XPath(format!("//a[contains(., '{product}')]"))
}

/// Features of the Shop (Shopware 6 admin) UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopFeature {
    LoginUser,
    LoginPassword,
    LoginSubmit,
    SearchInput,
    TabGeneral,
    TabAdvancedPricing,
    DeleteRuleButton,
    /// Rule picker shown while the pricing section is empty.
    EmptyStateRulePicker,
    AddPricingRule,
    /// Rule picker inside the freshly added second card.
    NewCardRuleInput,
    /// Net price inputs across all pricing-tier cards.
    NetPriceInputs,
    ManufacturerField,
    SingleSelectSelection,
    SingleSelectText,
    ResultListContent,
    ResultListItems,
    FirstResultOption,
    GrossPriceField,
    MinPurchaseCell,
    MinPurchaseInput,
    ScalingCell,
    ScalingInput,
    /// Sales-channel multi-select container.
    VisibilityField,
    SelectedChannelChip,
    ChipDismiss,
    ExpandIndicator,
    LanguageSwitch,
    /// German entry; always index 0 in the switcher.
    GermanLanguageOption,
    SaveModalButton,
    ProductNameField,
    /// Toolbar toggle into raw-markup mode.
    CodeToggle,
    CodeEditor,
}

impl ShopFeature {
    pub fn selector(self) -> Selector {
        match self {
            ShopFeature::LoginUser => Selector::Id("sw-field--username".into()),
            ShopFeature::LoginPassword => Selector::Id("sw-field--password".into()),
            ShopFeature::LoginSubmit => Selector::Css("button.sw-login__login-action".into()),
            ShopFeature::SearchInput => Selector::Css("input.sw-search-bar__input".into()),
            ShopFeature::TabGeneral => Selector::XPath(
                "//a[contains(@href, '/base') and contains(@class, 'sw-product-detail__tab-general')]"
                    .into(),
            ),
            ShopFeature::TabAdvancedPricing => Selector::XPath(
                "//a[contains(@href, '/prices') and contains(@class, 'sw-product-detail__tab-advanced-prices')]"
                    .into(),
            ),
            ShopFeature::DeleteRuleButton => {
                Selector::XPath("//button[.//span[text()='Delete pricing rule']]".into())
            }
            ShopFeature::EmptyStateRulePicker => Selector::Css(
                "div.sw-product-detail-context-prices__empty-state-select-rule div.sw-select__selection"
                    .into(),
            ),
            ShopFeature::AddPricingRule => {
                Selector::Css("button.sw-product-detail-context-prices__add-new-rule".into())
            }
            ShopFeature::NewCardRuleInput => Selector::XPath(
                "//div[contains(@class, 'context-price') and contains(@class, 'context-price-group-1')]//input[@placeholder='Select a conditional rule...']"
                    .into(),
            ),
            ShopFeature::NetPriceInputs => Selector::XPath(
                "//input[@name='sw-price-field-net' and @aria-label='Euro']".into(),
            ),
            ShopFeature::ManufacturerField => Selector::Id("manufacturerId".into()),
            ShopFeature::SingleSelectSelection => {
                Selector::Css("div.sw-entity-single-select__selection".into())
            }
            ShopFeature::SingleSelectText => {
                Selector::Css("div.sw-entity-single-select__selection-text".into())
            }
            ShopFeature::ResultListContent => {
                Selector::Css("div.sw-select-result-list__content".into())
            }
            ShopFeature::ResultListItems => {
                Selector::Css("ul.sw-select-result-list__item-list".into())
            }
            ShopFeature::FirstResultOption => Selector::Css("li.sw-select-option--0".into()),
            ShopFeature::GrossPriceField => Selector::Id("sw-price-field-gross".into()),
            ShopFeature::MinPurchaseCell => Selector::XPath(
                ".//td[contains(@class, 'sw-data-grid__cell--minimumPurchase')]".into(),
            ),
            ShopFeature::MinPurchaseInput => {
                Selector::XPath(".//input[@aria-label='Minimum purchase']".into())
            }
            ShopFeature::ScalingCell => {
                Selector::XPath(".//td[contains(@class, 'sw-data-grid__cell--scaling')]".into())
            }
            ShopFeature::ScalingInput => {
                Selector::XPath(".//input[@aria-label='Scaling']".into())
            }
            ShopFeature::VisibilityField => {
                Selector::Css("div.sw-product-category-form__visibility_field".into())
            }
            ShopFeature::SelectedChannelChip => Selector::Css(
                "ul.sw-select-selection-list li.sw-select-selection-list__item-holder".into(),
            ),
            ShopFeature::ChipDismiss => Selector::Css("button.sw-label__dismiss".into()),
            ShopFeature::ExpandIndicator => Selector::Css(
                "div.sw-select__selection-indicators span.sw-select__select-indicator-expand"
                    .into(),
            ),
            ShopFeature::LanguageSwitch => {
                Selector::Css("div.sw-language-switch div.sw-select__selection".into())
            }
            ShopFeature::GermanLanguageOption => {
                Selector::Css("li.sw-select-result.sw-select-option--0".into())
            }
            ShopFeature::SaveModalButton => {
                Selector::Id("sw-language-switch-save-changes-button".into())
            }
            ShopFeature::ProductNameField => Selector::Id("sw-field--product-name".into()),
            ShopFeature::CodeToggle => Selector::XPath(
                "//div[contains(@class, 'sw-text-editor-toolbar-button__icon') and .//span[contains(@class, 'icon--regular-code-xs')]]"
                    .into(),
            ),
            ShopFeature::CodeEditor => {
                Selector::Css("div.sw-code-editor__editor.ace_editor".into())
            }
        }
    }
}

/// A search-bar result link whose label carries the article number.
pub fn shop_search_result(artikelnummer: &str) -> Selector {
    Selector::XPath(format!(
        "//a[contains(@class, 'sw-search-bar-item__link') and .//span[contains(text(), '{artikelnummer}')]]"
    ))
}

/// A dropdown entry in a rule picker, matched by its highlighted label.
pub fn rule_option(rule_text: &str) -> Selector {
    Selector::XPath(format!(
        "//li[contains(@class, 'sw-select-result') and .//div[contains(@class, 'sw-highlight-text') and normalize-space(text())='{rule_text}']]"
    ))
}

/// A language switcher entry, matched by its display name.
pub fn language_option(display_name: &str) -> Selector {
    Selector::XPath(format!(
        "//li[contains(@class, 'sw-select-result') and .//div[normalize-space(text())='{display_name}']]"
    ))
}

/// The n-th entry of an expanded sales-channel dropdown.
pub fn channel_option(index: usize) -> Selector {
    Selector::Css(format!("li.sw-select-result.sw-select-option--{index}"))
}

/// A pricing-tier grid row, matched by exact customer-group label.
pub fn grid_row(group: &str) -> Selector {
    Selector::XPath(format!(
        "//tr[contains(@class, 'sw-data-grid__row') and .//span[normalize-space(text())='{group}']]"
    ))
}
