use crate::view::{Instruction, ViewMode};
use regex::Regex;

/// Display adapter: applies instructions to whatever UI hosts the widget.
pub trait Surface {
    fn apply(&mut self, instruction: &Instruction);

    fn apply_all(&mut self, instructions: &[Instruction]) {
        for i in instructions {
            self.apply(i);
        }
    }
}

/// Headless surface holding the page's regions in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    pub content_html: String,
    pub results_html: String,
    pub visible: ViewMode,
    pub history: Vec<String>,
    pub scrolled_to: Option<String>,
    pending_scroll: Option<(String, u64)>,
}

impl MemorySurface {
    pub fn with_content(html: impl Into<String>) -> Self {
        Self { content_html: html.into(), ..Self::default() }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    /// Let `ms` milliseconds pass, firing a due scroll if its element exists.
    pub fn advance(&mut self, ms: u64) {
        let Some((id, remaining)) = self.pending_scroll.take() else { return };
        if ms < remaining {
            self.pending_scroll = Some((id, remaining - ms));
            return;
        }
        if has_element_id(&self.content_html, &id) {
            self.scrolled_to = Some(id);
        }
    }
}

// True when some tag in `html` carries `id` as its id attribute, in any quoting style.
fn has_element_id(html: &str, id: &str) -> bool {
    let id = regex::escape(id);
    let attr = format!(r#"<[^>]*\sid\s*=\s*(?:"{id}"|'{id}'|{id}[\s/>])"#);
    Regex::new(&attr).is_ok_and(|re| re.is_match(html))
}

impl Surface for MemorySurface {
    fn apply(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::SetResults { html } => self.results_html.clone_from(html),
            Instruction::Show { mode } => self.visible = *mode,
            Instruction::ReplaceContent { html } => self.content_html.clone_from(html),
            Instruction::PushHistory { url } => self.history.push(url.clone()),
            Instruction::ScrollIntoView { id, delay_ms, .. } => self.pending_scroll = Some((id.clone(), *delay_ms)),
        }
    }
}
