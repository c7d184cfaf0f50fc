//! RSS 2.0 serialization

use crate::feed::FeedItem;
use crate::Result;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Channel-level fields of the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            title: "Dilbert".to_string(),
            link: "https://dilbert.com".to_string(),
            description: "Dilbert Daily Strip".to_string(),
        }
    }
}

/// Serializes `items` as an RSS 2.0 document with a single channel
///
/// Every item links to its image: `<link>` and `<guid>` both carry the image
/// URL and `<description>` embeds it in a CDATA `<img>` tag.
pub fn write_rss(channel: &Channel, items: &[FeedItem]) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;

    for item in items {
        write_item(&mut writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(writer.into_inner())
}

fn write_item(writer: &mut Writer<Vec<u8>>, item: &FeedItem) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    write_text_element(writer, "title", &item.title)?;
    write_text_element(writer, "link", &item.image_url)?;
    write_text_element(writer, "guid", &item.image_url)?;
    write_text_element(writer, "pubDate", &item.pub_date())?;

    writer.write_event(Event::Start(BytesStart::new("description")))?;
    let img = format!(r#"<img src="{}">"#, item.image_url);
    writer.write_event(Event::CData(BytesCData::new(img.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("description")))?;

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
