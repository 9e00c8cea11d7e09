//! A narrow view of a parsed page: select by CSS, walk up to an ancestor, read
//! attributes and text. Extraction rules only talk to these traits, so the HTML
//! parser behind them can be swapped without touching any site rules.

use scraper::{ElementRef, Html, Selector};

use crate::errors::ExtractionError;

/// A compiled CSS selector.
#[derive(Debug, Clone)]
pub struct Css {
    selector: Selector,
}

impl Css {
    pub fn parse(source: &str) -> Result<Self, ExtractionError> {
        let selector = Selector::parse(source).map_err(|e| ExtractionError::InvalidSelector {
            selector: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { selector })
    }
}

pub trait MarkupNode<'a>: Copy {
    fn attribute(&self, name: &str) -> Option<&'a str>;

    /// All descendant text, concatenated.
    fn text_content(&self) -> String;

    /// Nearest node matching `css`, starting with this one and walking up.
    fn closest(&self, css: &Css) -> Option<Self>;

    /// First descendant matching `css`, in document order.
    fn find_first(&self, css: &Css) -> Option<Self>;
}

pub trait MarkupDocument {
    type Node<'a>: MarkupNode<'a>
    where
        Self: 'a;

    fn select<'a>(&'a self, css: &Css) -> Vec<Self::Node<'a>>;
}

pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

impl MarkupDocument for HtmlDocument {
    type Node<'a>
        = ElementRef<'a>
    where
        Self: 'a;

    fn select<'a>(&'a self, css: &Css) -> Vec<ElementRef<'a>> {
        self.html.select(&css.selector).collect()
    }
}

impl<'a> MarkupNode<'a> for ElementRef<'a> {
    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn closest(&self, css: &Css) -> Option<Self> {
        std::iter::once(*self)
            .chain(self.ancestors().filter_map(ElementRef::wrap))
            .find(|el| css.selector.matches(el))
    }

    fn find_first(&self, css: &Css) -> Option<Self> {
        self.select(&css.selector).find(|el| el.id() != self.id())
    }
}
