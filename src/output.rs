use std::io::{self, Write};

use serde::Serialize;

use crate::app::{LinkResult, SearchHit};
use crate::catalog::CategorySummary;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: &'a [SearchHit],
}

#[derive(Debug, Serialize)]
struct CategoriesOutput<'a> {
    categories: &'a [CategorySummary],
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_search(query: &str, hits: &[SearchHit]) -> io::Result<()> {
        Self::print_json(&SearchOutput {
            query,
            results: hits,
        })
    }

    pub fn print_link(result: &LinkResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_categories(categories: &[CategorySummary]) -> io::Result<()> {
        Self::print_json(&CategoriesOutput { categories })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_search(query: &str, hits: &[SearchHit]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        if hits.is_empty() {
            writeln!(stdout, "no groups match {query:?}")?;
            return Ok(());
        }
        for hit in hits {
            writeln!(
                stdout,
                "{}  {}\n    Group ID: {}\n    {}",
                hit.record.name, hit.record.parent_category, hit.record.id, hit.url
            )?;
        }
        Ok(())
    }

    pub fn print_link(result: &LinkResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", result.url)?;
        if result.copied {
            writeln!(stdout, "{}", crate::app::COPIED_MESSAGE)?;
        }
        Ok(())
    }

    pub fn print_categories(categories: &[CategorySummary]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for category in categories {
            writeln!(stdout, "{:>4}  {}", category.groups, category.name)?;
        }
        Ok(())
    }
}
