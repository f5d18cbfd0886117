//! `twig find` command - Look up commits by exact message.

use anyhow::Result;

use super::utils::open_repo;
use crate::output;

/// Run the find command.
pub fn run(message: &str) -> Result<()> {
    let repo = open_repo()?;
    for id in repo.find(message)? {
        output::essential(id.as_str());
    }
    Ok(())
}
