//! XML rendering.
//!
//! Identifying fields (symbol, period key, status) are attributes; values
//! are child elements. Empty containers are written self-closing.

use std::io::{Cursor, Write};

use anyhow::Result;
use market_returns_lib::{
    format_pct, Dashboard, IndexPanel, PerformancePoint, PeriodOutcome, ReturnSet, TrackedIndex,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::output::HistorySeries;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn element<'a>(tag: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut el = BytesStart::new(tag);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    el
}

fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn new_document() -> Result<XmlWriter> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn finish(writer: XmlWriter) -> Result<String> {
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// Writes `<tag attrs>` around `items`, or `<tag attrs/>` when there are none.
fn write_list<T>(
    writer: &mut XmlWriter,
    tag: &str,
    attrs: &[(&str, &str)],
    items: &[T],
    mut write_item: impl FnMut(&mut XmlWriter, &T) -> Result<()>,
) -> Result<()> {
    if items.is_empty() {
        writer.write_event(Event::Empty(element(tag, attrs)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(element(tag, attrs)))?;
    for item in items {
        write_item(writer, item)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_point(writer: &mut XmlWriter, point: &PerformancePoint) -> Result<()> {
    let date = point.date.to_string();
    let price = point.price.to_string();
    let change = point.change_pct.map(|c| c.to_string());
    let mut attrs = vec![("date", date.as_str()), ("price", price.as_str())];
    if let Some(change) = &change {
        attrs.push(("change_pct", change.as_str()));
    }
    writer.write_event(Event::Empty(element("point", &attrs)))?;
    Ok(())
}

fn write_returns(writer: &mut XmlWriter, returns: &ReturnSet) -> Result<()> {
    let last = returns.last_observation.map(|ts| ts.to_rfc3339());
    let mut attrs = Vec::new();
    if let Some(last) = &last {
        attrs.push(("last_observation", last.as_str()));
    }
    let periods: Vec<_> = returns.periods.iter().collect();

    write_list(writer, "returns", &attrs, &periods, |w, (period, outcome)| {
        let base = [("key", period.short_name()), ("label", period.long_name())];
        match outcome {
            PeriodOutcome::Available(r) => {
                let mut attrs = base.to_vec();
                attrs.push(("status", "available"));
                w.write_event(Event::Start(element("period", &attrs)))?;
                write_text(w, "boundary", &r.boundary.to_string())?;
                write_text(w, "start_price", &r.start_price.to_string())?;
                write_text(w, "start_timestamp", &r.start_timestamp.to_rfc3339())?;
                write_text(w, "current_price", &r.current_price.to_string())?;
                write_text(w, "current_timestamp", &r.current_timestamp.to_rfc3339())?;
                write_text(w, "return_pct", &r.return_pct.to_string())?;
                write_text(w, "display", &format_pct(r.return_pct))?;
                w.write_event(Event::End(BytesEnd::new("period")))?;
            }
            PeriodOutcome::Unavailable { reason } => {
                let mut attrs = base.to_vec();
                attrs.push(("status", "unavailable"));
                attrs.push(("reason", reason.kind()));
                w.write_event(Event::Start(element("period", &attrs)))?;
                w.write_event(Event::Text(BytesText::new(&reason.to_string())))?;
                w.write_event(Event::End(BytesEnd::new("period")))?;
            }
        }
        Ok(())
    })
}

fn write_panel(writer: &mut XmlWriter, panel: &IndexPanel) -> Result<()> {
    let attrs = [("symbol", panel.symbol.as_str()), ("name", panel.name.as_str())];
    writer.write_event(Event::Start(element("index", &attrs)))?;
    if let Some(desc) = &panel.description {
        write_text(writer, "description", desc.trim())?;
    }
    write_returns(writer, &panel.returns)?;
    write_list(writer, "history", &[], &panel.history, write_point)?;
    writer.write_event(Event::End(BytesEnd::new("index")))?;
    Ok(())
}

pub fn dashboard_to_xml(dashboard: &Dashboard) -> Result<String> {
    let mut writer = new_document()?;
    let as_of = dashboard.as_of.to_rfc3339();
    let attrs = [("as_of", as_of.as_str()), ("timezone", dashboard.timezone.name())];
    write_list(&mut writer, "dashboard", &attrs, &dashboard.panels, write_panel)?;
    finish(writer)
}

pub fn history_to_xml(series: &[HistorySeries<'_>]) -> Result<String> {
    let mut writer = new_document()?;
    write_list(&mut writer, "history", &[], series, |w, s| {
        let attrs = [
            ("symbol", s.symbol),
            ("name", s.name),
            ("period", s.period.short_name()),
        ];
        write_list(w, "series", &attrs, &s.points, write_point)
    })?;
    finish(writer)
}

pub fn indices_to_xml(indices: &[TrackedIndex]) -> Result<String> {
    let mut writer = new_document()?;
    write_list(&mut writer, "indices", &[], indices, |w, index| {
        let attrs = [("symbol", index.symbol.as_str()), ("name", index.name.as_str())];
        match &index.description {
            Some(desc) => {
                w.write_event(Event::Start(element("index", &attrs)))?;
                write_text(w, "description", desc.trim())?;
                w.write_event(Event::End(BytesEnd::new("index")))?;
            }
            None => {
                w.write_event(Event::Empty(element("index", &attrs)))?;
            }
        }
        Ok(())
    })?;
    finish(writer)
}
