//! Persistence of a suspended game for one user.
//!
//! The whole record is rewritten after every accepted move. There is a single
//! writer per user, so no locking is done; writes go through a temporary file
//! and a rename so a crash never leaves half a session behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::food::Food;
use crate::snake::Snake;

pub const SESSION_FILE: &str = "snake.json";
pub const PROFILE_FILE: &str = "profile.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub snake: Snake,
    pub food: Food,
    pub score: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Profile {
    #[serde(default, rename = "snake-highscore")]
    snake_highscore: u32,
}

/// Where the engine keeps its suspended session and high score.
pub trait SessionStore {
    fn exists(&self) -> Result<bool>;

    /// `Ok(None)` when there is nothing to resume.
    fn load(&self) -> Result<Option<Session>>;

    fn save(&mut self, session: &Session) -> Result<()>;

    fn archive_high_score(&mut self, score: u32) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

/// JSON files under `<data-dir>/<user>/`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Fails when the user directory is missing; it is created at
    /// registration, never here.
    pub fn open(data_dir: &Path, user: &str) -> Result<Self> {
        let dir = data_dir.join(user);
        if !dir.is_dir() {
            return Err(Error::MissingUserDir(dir));
        }
        Ok(Self { dir })
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    pub fn high_score(&self) -> Result<u32> {
        let path = self.profile_path();
        match read_json::<Profile>(&path)? {
            Some(profile) => Ok(profile.snake_highscore),
            None => Ok(0),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn exists(&self) -> Result<bool> {
        self.session_path()
            .try_exists()
            .map_err(|e| Error::io(self.session_path(), e))
    }

    fn load(&self) -> Result<Option<Session>> {
        let path = self.session_path();
        let Some(session) = read_json::<Session>(&path)? else {
            return Ok(None);
        };
        if session.snake.is_empty() {
            return Err(Error::EmptySnake(path));
        }
        debug!(path = %path.display(), score = session.score, "loaded session");
        Ok(Some(session))
    }

    fn save(&mut self, session: &Session) -> Result<()> {
        write_json(&self.session_path(), session)
    }

    fn archive_high_score(&mut self, score: u32) -> Result<()> {
        let best = self.high_score()?.max(score);
        info!(score, best, "archiving high score");
        write_json(&self.profile_path(), &Profile { snake_highscore: best })
    }

    fn clear(&mut self) -> Result<()> {
        let path = self.session_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}

/// Keeps everything in memory; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    pub session: Option<Session>,
    pub high_score: u32,
    pub saves: usize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn exists(&self) -> Result<bool> {
        Ok(self.session.is_some())
    }

    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.clone())
    }

    fn save(&mut self, session: &Session) -> Result<()> {
        self.session = Some(session.clone());
        self.saves += 1;
        Ok(())
    }

    fn archive_high_score(&mut self, score: u32) -> Result<()> {
        self.high_score = self.high_score.max(score);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }
}

pub(crate) fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    serde_json::from_str(&raw).map(Some).map_err(|e| Error::corrupt(path, e))
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| Error::corrupt(&tmp, e))?;
        writer.flush().map_err(|e| Error::io(&tmp, e))?;
        writer.get_ref().sync_all().map_err(|e| Error::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::entity::Position;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn sample_session() -> Session {
        let config = EngineConfig::default();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut food = Food::unplaced(now, config.food_ttl());
        food.position = Position::new(8, 3);
        Session {
            snake: Snake::from_config(&config),
            food,
            score: 4,
        }
    }

    fn user_store() -> (TempDir, FileSessionStore) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ana")).unwrap();
        let store = FileSessionStore::open(dir.path(), "ana").unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_user_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = FileSessionStore::open(dir.path(), "nobody").unwrap_err();
        assert!(matches!(err, Error::MissingUserDir(_)));
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, mut store) = user_store();
        assert!(!store.exists().unwrap());
        assert_eq!(store.load().unwrap(), None);

        let session = sample_session();
        store.save(&session).unwrap();

        assert!(store.exists().unwrap());
        assert_eq!(store.load().unwrap(), Some(session));
        assert!(!store.session_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_session_field_names() {
        let (_dir, mut store) = user_store();
        store.save(&sample_session()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.session_path()).unwrap()).unwrap();
        assert_eq!(json["snake"]["renderedDirection"], "right");
        assert_eq!(json["snake"]["hungerCounter"], 30);
        assert_eq!(json["snake"]["positions"][0]["position"]["x"], 5);
        assert_eq!(json["food"]["colorFlag"], true);
        assert!(json["food"]["expiry"].is_object());
        assert_eq!(json["score"], 4);
    }

    #[test]
    fn test_corrupt_session_is_an_error() {
        let (_dir, store) = user_store();
        fs::write(store.session_path(), "snake: [").unwrap();
        assert!(matches!(store.load(), Err(Error::Corrupt { .. })));
    }

    #[test]
    fn test_empty_snake_is_rejected() {
        let (_dir, mut store) = user_store();
        let mut session = sample_session();
        session.snake.segments.clear();
        store.save(&session).unwrap();
        assert!(matches!(store.load(), Err(Error::EmptySnake(_))));
    }

    #[test]
    fn test_archive_keeps_best_and_clear_removes_session() {
        let (_dir, mut store) = user_store();
        store.save(&sample_session()).unwrap();

        store.archive_high_score(9).unwrap();
        store.archive_high_score(3).unwrap();
        store.clear().unwrap();

        assert_eq!(store.high_score().unwrap(), 9);
        assert!(!store.exists().unwrap());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemorySessionStore::new();
        store.save(&sample_session()).unwrap();
        store.archive_high_score(4).unwrap();
        store.clear().unwrap();

        assert_eq!(store.saves, 1);
        assert_eq!(store.high_score, 4);
        assert!(!store.exists().unwrap());
    }
}
