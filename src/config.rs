use crate::{
    domain::BoardConfig,
    error::{KisekiError, Result},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// File-based board configuration store
pub struct ConfigStore {
    root_path: PathBuf,
}

impl ConfigStore {
    const KISEKI_DIR: &'static str = ".kiseki";
    const BOARD_FILE: &'static str = "board.json";

    /// Creates a store for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KISEKI_DIR),
        }
    }

    pub fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the config directory and a default board if none exists
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.board_file().exists() {
            self.save_board_config(&BoardConfig::default()).await?;
            info!(path = %self.board_file().display(), "wrote default board config");
        }

        Ok(())
    }

    pub async fn save_board_config(&self, config: &BoardConfig) -> Result<()> {
        config.validate()?;
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(config)?;
        fs::write(self.board_file(), json).await?;

        Ok(())
    }

    pub async fn load_board_config(&self) -> Result<BoardConfig> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(KisekiError::ProjectNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        BoardConfig::from_json(&contents)
    }

    /// Loads the saved config, falling back to the default board
    pub async fn load_or_default(&self) -> Result<BoardConfig> {
        match self.load_board_config().await {
            Err(KisekiError::ProjectNotInitialized) => Ok(BoardConfig::default()),
            other => other,
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }
}
