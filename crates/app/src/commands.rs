//! Command handlers.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use relay_application::ports::{RecordError, RecordStore};
use relay_application::{
    BuildError, Dispatcher, EnvironmentStore, HistoryRecorder, RequestBuilder, VariableResolver,
};
use relay_domain::{
    DispatchOutcome, Environment, EnvironmentPatch, RecordFields, RequestTemplate, VariableMap,
};
use relay_infrastructure::{
    BackendRecordStore, FileKeyValueStore, FileRecordStore, ProbeNetworkStatus,
    ReqwestProxyClient, RelaySettings, StaticIdentityProvider, SystemClock,
};
use serde::Serialize;

use crate::cli::{CollectionCommands, EnvCommands, HistoryCommands, RequestArgs};

/// Printed instead of the parser detail when a body is rejected.
const MALFORMED_BODY: &str = "Body must be valid JSON.";

type Environments = EnvironmentStore<FileKeyValueStore>;
type Records = HistoryRecorder<Arc<dyn RecordStore>, StaticIdentityProvider, SystemClock>;

/// Everything a command needs, built from the resolved settings.
pub struct App {
    settings: RelaySettings,
}

impl App {
    pub const fn new(settings: RelaySettings) -> Self {
        Self { settings }
    }

    async fn environments(&self) -> Result<Environments> {
        EnvironmentStore::load(FileKeyValueStore::new(&self.settings.data_dir))
            .await
            .context("failed to load environments")
    }

    fn records(&self) -> Records {
        let store: Arc<dyn RecordStore> = match &self.settings.backend_url {
            Some(url) => Arc::new(BackendRecordStore::new(url.clone())),
            None => Arc::new(FileRecordStore::new(&self.settings.data_dir)),
        };
        let identity = StaticIdentityProvider::from_parts(
            self.settings.user_id.as_deref(),
            self.settings.access_token.as_deref(),
        );
        HistoryRecorder::new(store, identity, SystemClock::new())
    }

    fn collection_or_default(&self, collection: Option<String>) -> Option<String> {
        collection.or_else(|| self.settings.collection_id.clone())
    }

    pub async fn env(&self, command: EnvCommands) -> Result<ExitCode> {
        let mut store = self.environments().await?;

        match command {
            EnvCommands::List => print_environments(&store),
            EnvCommands::Show { id } => {
                let environment = match id.as_deref() {
                    Some(id) => store.get(id),
                    None => store.current(),
                };
                let Some(environment) = environment else {
                    bail!("no such environment: {}", id.as_deref().unwrap_or("<current>"));
                };
                print_json(environment)?;
            }
            EnvCommands::Create { name, vars } => {
                let variables = if vars.is_empty() {
                    Environment::starter_variables()
                } else {
                    vars.into_iter().collect()
                };
                let id = store.create(&name, variables).await?;
                println!("{id}");
            }
            EnvCommands::Update {
                id,
                name,
                vars,
                unset,
            } => {
                let Some(existing) = store.get(&id) else {
                    bail!("no such environment: {id}");
                };

                let variables = if vars.is_empty() && unset.is_empty() {
                    None
                } else {
                    let mut variables: VariableMap = existing.variables.clone();
                    for key in &unset {
                        variables.remove(key);
                    }
                    variables.extend(vars);
                    Some(variables)
                };

                let patch = EnvironmentPatch { name, variables };
                if patch.is_empty() {
                    bail!("nothing to update: pass --name, --var or --unset");
                }
                store.update(&id, patch).await?;
                if let Some(environment) = store.get(&id) {
                    print_json(environment)?;
                }
            }
            EnvCommands::Delete { id } => {
                if !store.delete(&id).await? {
                    bail!("no such environment: {id}");
                }
                match store.current_id() {
                    Some(current) => println!("deleted {id}, current is now {current}"),
                    None => println!("deleted {id}, no environments left"),
                }
            }
            EnvCommands::Use { id } => {
                if store.get(&id).is_none() {
                    bail!("no such environment: {id}");
                }
                store.set_current(&id).await?;
                println!("now using {id}");
            }
            EnvCommands::Refresh => {
                store.refresh().await?;
                print_environments(&store);
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    pub async fn send(&self, request: &RequestArgs, collection: Option<String>) -> Result<ExitCode> {
        self.send_template(&request.template(), request.environment.as_deref(), collection)
            .await
    }

    async fn send_template(
        &self,
        template: &RequestTemplate,
        environment: Option<&str>,
        collection: Option<String>,
    ) -> Result<ExitCode> {
        let resolver = self.resolver_for(environment).await?;

        let proxy = ReqwestProxyClient::new(&self.settings.proxy_url)
            .context("failed to create proxy client")?;
        let dispatcher = Dispatcher::new(proxy, ProbeNetworkStatus::new())
            .with_recorder(Arc::new(self.records()));

        let collection = self.collection_or_default(collection);
        let outcome = match dispatcher.send(template, &resolver, collection).await {
            Ok(outcome) => outcome,
            Err(BuildError::MalformedBody(detail)) => {
                tracing::debug!(%detail, "body rejected");
                eprintln!("{MALFORMED_BODY}");
                return Ok(ExitCode::FAILURE);
            }
        };
        dispatcher.flush_recordings().await;

        match outcome {
            DispatchOutcome::Success { payload } => {
                print_json(&payload)?;
                Ok(ExitCode::SUCCESS)
            }
            DispatchOutcome::Failure { message, .. } => {
                eprintln!("{message}");
                Ok(ExitCode::FAILURE)
            }
        }
    }

    pub async fn preview(&self, request: &RequestArgs) -> Result<ExitCode> {
        let resolver = self.resolver_for(request.environment.as_deref()).await?;

        match RequestBuilder::new(resolver).build(&request.template()) {
            Ok(resolved) => {
                print_json(&resolved)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(BuildError::MalformedBody(_)) => {
                eprintln!("{MALFORMED_BODY}");
                Ok(ExitCode::FAILURE)
            }
        }
    }

    pub async fn save(&self, request: &RequestArgs, collection: Option<String>) -> Result<ExitCode> {
        let collection = self.collection_or_default(collection);
        let saved = self
            .records()
            .save_draft(&request.template(), collection.as_deref())
            .await
            .map_err(signed_in_hint)?;
        print_json(&saved)?;
        Ok(ExitCode::SUCCESS)
    }

    pub async fn history(&self, command: HistoryCommands) -> Result<ExitCode> {
        let records = self.records();
        match command {
            HistoryCommands::List => {
                print_json(&records.history().await.map_err(signed_in_hint)?)?;
            }
            HistoryCommands::Show { id } => {
                let Some(record) = records.history_entry(&id).await.map_err(signed_in_hint)? else {
                    bail!("no such history entry: {id}");
                };
                print_json(&RequestTemplate::from(&record.fields))?;
            }
            HistoryCommands::Resend {
                id,
                environment,
                collection,
            } => {
                let Some(record) = records.history_entry(&id).await.map_err(signed_in_hint)? else {
                    bail!("no such history entry: {id}");
                };
                let template = resend_template(&record.fields);
                return self
                    .send_template(&template, environment.as_deref(), collection)
                    .await;
            }
            HistoryCommands::Delete { id } => {
                records.delete_history(&id).await.map_err(signed_in_hint)?;
                println!("deleted {id}");
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    pub async fn collections(&self, command: CollectionCommands) -> Result<ExitCode> {
        let records = self.records();
        match command {
            CollectionCommands::List => {
                print_json(&records.collections().await.map_err(signed_in_hint)?)?;
            }
            CollectionCommands::Create { name } => {
                print_json(&records.create_collection(&name).await.map_err(signed_in_hint)?)?;
            }
            CollectionCommands::Items { id } => {
                print_json(&records.collection_items(&id).await.map_err(signed_in_hint)?)?;
            }
            CollectionCommands::Item {
                collection_id,
                item_id,
            } => {
                let item = records
                    .collection_item(&collection_id, &item_id)
                    .await
                    .map_err(signed_in_hint)?;
                let Some(item) = item else {
                    bail!("no such item in {collection_id}: {item_id}");
                };
                print_json(&RequestTemplate::from(&item.fields))?;
            }
            CollectionCommands::Delete { id } => {
                records.delete_collection(&id).await.map_err(signed_in_hint)?;
                println!("deleted {id}");
            }
            CollectionCommands::RemoveItem { id } => {
                records.delete_collection_item(&id).await.map_err(signed_in_hint)?;
                println!("removed {id}");
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn resolver_for(&self, environment: Option<&str>) -> Result<VariableResolver> {
        let store = self.environments().await?;
        match environment {
            Some(id) => match store.get(id) {
                Some(environment) => Ok(VariableResolver::from_environment(Some(environment))),
                None => bail!("no such environment: {id}"),
            },
            None => Ok(store.snapshot()),
        }
    }
}

/// The template a history entry is sent again with.
///
/// A sent entry stores its final URL, which already carries the query its
/// params produced; drafts store the URL as authored.
fn resend_template(fields: &RecordFields) -> RequestTemplate {
    let mut template = RequestTemplate::from(fields);
    if fields.response.is_some() {
        template.params.clear();
    }
    template
}

fn signed_in_hint(error: RecordError) -> anyhow::Error {
    match error {
        RecordError::Unauthenticated => {
            anyhow::anyhow!("not signed in: set user_id in settings or RELAY_USER_ID")
        }
        other => other.into(),
    }
}

fn print_environments(store: &Environments) {
    for environment in store.list() {
        let marker = if store.current_id() == Some(environment.id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!("{marker} {:<24} {}", environment.id, environment.name);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{json}");
    Ok(())
}
