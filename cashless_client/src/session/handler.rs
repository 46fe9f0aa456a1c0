use cashless_core::error::ClientResult;
use sled::{Db, IVec};

const TREE_NAME: &str = "session";
const TOKEN_KEY: &str = "auth_token";

/// Durable home of the bearer token. Absence means logged out.
#[derive(Clone)]
pub struct SessionStore {
    tree: sled::Tree,
}

impl SessionStore {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self { tree })
    }

    pub fn load_token(&self) -> ClientResult<Option<String>> {
        let token = self
            .tree
            .get(TOKEN_KEY)?
            .and_then(|ivec: IVec| String::from_utf8(ivec.to_vec()).ok())
            .filter(|token| !token.is_empty());

        Ok(token)
    }

    pub fn save_token(&self, token: &str) -> ClientResult<()> {
        self.tree.insert(TOKEN_KEY, token.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn clear_token(&self) -> ClientResult<()> {
        self.tree.remove(TOKEN_KEY)?;
        self.tree.flush()?;
        Ok(())
    }
}
