//! The staged operations the menu exposes, and the per-product pipeline
//! the batch runner drives.

use crate::batch::{BatchRunner, BatchState, ProductPipeline};
use crate::config::Config;
use crate::crm::CrmDownloader;
use crate::error::SyncError;
use crate::login::Deployment;
use crate::record::{self, ProductRecord};
use crate::shop::ShopUploader;
use crate::translate::Translator;
use produktsync::Session;
use tracing::info;

pub struct ProcessFacade {
    session: Session,
    config: Config,
    translator: Translator,
}

impl ProcessFacade {
    pub fn new(session: Session, config: Config) -> Self {
        let translator = match &config.deepl_api_url {
            Some(url) => Translator::with_api_url(&config.deepl_auth_key, url),
            None => Translator::new(&config.deepl_auth_key),
        };
        Self {
            session,
            config,
            translator,
        }
    }

    fn deployment(&self) -> Deployment {
        Deployment::load(&self.config.login_marker_file)
    }

    /// Extract the currently open CRM product and snapshot it.
    pub async fn run_download_process(&self) -> Result<ProductRecord, SyncError> {
        let mut crm = CrmDownloader::new(self.session.clone(), self.deployment());
        let record = crm.run().await?;
        record::save(&self.config.record_file, &record)?;
        Ok(record)
    }

    /// Enrich the snapshot with translations and write it back.
    pub async fn run_translate_process(&self) -> Result<ProductRecord, SyncError> {
        let mut record = record::load(&self.config.record_file)?;
        self.translator.translate_product(&mut record).await;
        record::print_summary(&record);
        record::save(&self.config.record_file, &record)?;
        Ok(record)
    }

    /// Switch to the Shop and open the snapshot's product.
    pub async fn go_to_shop(&self) -> Result<(), SyncError> {
        let record = record::load(&self.config.record_file)?;
        let mut shop = ShopUploader::new(self.session.clone());
        shop.open_product(&record).await
    }

    /// Push the snapshot into the Shop.
    pub async fn run_upload_process(&self) -> Result<(), SyncError> {
        let record = record::load(&self.config.record_file)?;
        let mut shop = ShopUploader::new(self.session.clone());
        shop.run(&record).await
    }

    pub async fn run_full_process(&self) -> Result<(), SyncError> {
        self.run_download_process().await?;
        self.run_translate_process().await?;
        self.go_to_shop().await?;
        self.run_upload_process().await
    }

    /// Work through the queue file, resumable between runs.
    pub async fn run_batch_process(&self) -> Result<BatchState, SyncError> {
        let runner = BatchRunner::new(
            self.config.queue_file.clone(),
            self.config.counter_file.clone(),
            self.config.pause_file.clone(),
            self.config.failure_policy,
        );
        let mut pipeline = FacadePipeline { facade: self };
        runner.run(&mut pipeline).await
    }

    /// The per-product pipeline: locate in CRM, extract, snapshot,
    /// translate, snapshot again, then search and update the Shop.
    async fn process_product(&self, product: &str) -> Result<(), SyncError> {
        info!("processing {product:?}");
        let mut crm = CrmDownloader::new(self.session.clone(), self.deployment());
        crm.open_product(product).await?;
        let mut record = crm.run().await?;
        record::save(&self.config.record_file, &record)?;

        self.translator.translate_product(&mut record).await;
        record::save(&self.config.record_file, &record)?;

        let mut shop = ShopUploader::new(self.session.clone());
        shop.open_product(&record).await?;
        shop.run(&record).await
    }
}

struct FacadePipeline<'a> {
    facade: &'a ProcessFacade,
}

#[async_trait::async_trait]
impl ProductPipeline for FacadePipeline<'_> {
    async fn process(&mut self, product: &str) -> Result<(), SyncError> {
        self.facade.process_product(product).await
    }
}
