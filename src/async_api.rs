use crate::renderer::{engine_config, finish, preflight};
use crate::{Engine, EngineConfig, Error, LoadedPage, RenderJob, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Goto(PathBuf, oneshot::Sender<Result<LoadedPage>>),
    Screenshot(oneshot::Sender<Result<Vec<u8>>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly browser abstraction backed by a dedicated worker thread.
///
/// The worker thread constructs and owns the engine and executes commands
/// sent from async tasks, so the engine never has to be `Send`. Dropping
/// every handle without calling [`Browser::close`] still ends the worker and
/// drops the engine.
#[derive(Clone)]
pub struct Browser {
    cmd_tx: Sender<Command>,
}

/// A handle representing the page loaded in the browser.
#[derive(Clone)]
pub struct Page {
    cmd_tx: Sender<Command>,
}

impl Browser {
    /// Launch the default backend.
    pub async fn launch(config: EngineConfig) -> Result<Self> {
        Self::launch_with::<crate::DefaultEngine>(config).await
    }

    /// Launch a specific backend on a background thread.
    pub async fn launch_with<E: Engine + 'static>(config: EngineConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::spawn(move || {
            let mut engine = match E::new(config) {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Goto(path, resp) => {
                        let res = engine.load_file(&path).and_then(|_| engine.page_info());
                        let _ = resp.send(res);
                    }
                    Command::Screenshot(resp) => {
                        let _ = resp.send(engine.render_png());
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(engine.close());
                        return;
                    }
                }
            }
            debug!("all browser handles dropped; releasing engine");
        });

        init_rx
            .await
            .map_err(|e| Error::InitializationError(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    /// Page handle backed by the same worker thread.
    pub fn page(&self) -> Page {
        Page {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Shut down the worker and release the engine.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::Other("Browser worker already stopped".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

impl Page {
    /// Load a local HTML file; resolves once the document has finished loading.
    pub async fn goto(&self, path: &Path) -> Result<LoadedPage> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Goto(path.to_path_buf(), tx))
            .map_err(|_| Error::LoadError("Browser worker stopped".into()))?;
        rx.await
            .map_err(|e| Error::LoadError(format!("Goto canceled: {}", e)))?
    }

    /// Capture the viewport as PNG bytes.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Screenshot(tx))
            .map_err(|_| Error::EncodeError("Browser worker stopped".into()))?;
        rx.await
            .map_err(|e| Error::EncodeError(format!("Screenshot canceled: {}", e)))?
    }
}

/// Async counterpart of [`crate::render`] using the default backend.
pub async fn render_async(job: &RenderJob) -> Result<()> {
    render_async_with::<crate::DefaultEngine>(job).await
}

/// Async counterpart of [`crate::render_with`].
pub async fn render_async_with<E: Engine + 'static>(job: &RenderJob) -> Result<()> {
    let input = preflight(job)?;
    let browser = Browser::launch_with::<E>(engine_config(job)).await?;
    let page = browser.page();

    let captured = async {
        let loaded = page.goto(&input).await?;
        debug!("{}: loaded '{}' from {}", job.basename(), loaded.title, loaded.url);
        page.screenshot().await
    }
    .await;

    if let Err(e) = browser.close().await {
        warn!("engine teardown failed: {}", e);
    }

    finish(job, &captured?)
}
