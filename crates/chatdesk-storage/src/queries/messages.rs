// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message insert and paginated read queries.

use std::str::FromStr;

use chatdesk_core::types::MessageRecord;
use chatdesk_core::{ChatdeskError, Direction, Insertion, Message, MessageKind, Page, PageQuery};
use rusqlite::types::{Type, Value};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, odna, direction, type, text, image_url, timestamp, webhook_event_id";

/// Insert `message` unless its id is already stored.
///
/// The conflict check and the read-back of an existing row run in the same
/// closure on the writer thread, so two concurrent deliveries of one id
/// produce exactly one `Created`.
pub async fn insert_if_absent(db: &Database, message: &Message) -> Result<Insertion, ChatdeskError> {
    let record = MessageRecord::from(message.clone());
    let message = message.clone();
    let existing = db
        .connection()
        .call(move |conn| -> Result<Option<Message>, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO messages (id, odna, direction, type, text, image_url, timestamp, webhook_event_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    record.id,
                    record.odna,
                    record.direction.to_string(),
                    record.kind.to_string(),
                    record.text,
                    record.image_url,
                    record.timestamp,
                    record.webhook_event_id,
                ],
            )?;
            if inserted == 1 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM messages WHERE id = ?1"),
                params![record.id],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    Ok(match existing {
        Some(stored) => Insertion::Duplicate(stored),
        None => Insertion::Created(message),
    })
}

/// Read one page: the newest `limit` rows before the cursor, oldest first.
///
/// Rows are ordered by `(timestamp, id)`. One extra row is fetched to
/// decide `has_more` without a second query.
pub async fn query_page(db: &Database, query: &PageQuery) -> Result<Page, ChatdeskError> {
    let query = query.clone();
    db.connection()
        .call(move |conn| -> Result<Page, rusqlite::Error> {
            let mut sql = format!("SELECT {COLUMNS} FROM messages WHERE 1 = 1");
            let mut args: Vec<Value> = Vec::new();

            if let Some(counterpart) = &query.counterpart_id {
                sql.push_str(" AND odna = ?");
                args.push(Value::Text(counterpart.clone()));
            }
            match &query.before {
                Some(cursor) => match &cursor.id {
                    Some(id) => {
                        sql.push_str(" AND (timestamp < ? OR (timestamp = ? AND id < ?))");
                        args.push(Value::Integer(cursor.timestamp));
                        args.push(Value::Integer(cursor.timestamp));
                        args.push(Value::Text(id.clone()));
                    }
                    None => {
                        sql.push_str(" AND timestamp < ?");
                        args.push(Value::Integer(cursor.timestamp));
                    }
                },
                None => {}
            }
            sql.push_str(" ORDER BY timestamp DESC, id DESC LIMIT ?");
            let limit = query.limit as usize;
            args.push(Value::Integer(limit as i64 + 1));

            let mut stmt = conn.prepare(&sql)?;
            let mut messages = stmt
                .query_map(rusqlite::params_from_iter(args), row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;

            let has_more = messages.len() > limit;
            messages.truncate(limit);
            messages.reverse();
            Ok(Page { messages, has_more })
        })
        .await
        .map_err(map_tr_err)
}

/// Number of stored messages, optionally for one counterpart.
pub async fn count(db: &Database, counterpart_id: Option<&str>) -> Result<u64, ChatdeskError> {
    let counterpart_id = counterpart_id.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let n: i64 = match counterpart_id {
                Some(id) => conn.query_row(
                    "SELECT COUNT(*) FROM messages WHERE odna = ?1",
                    params![id],
                    |row| row.get(0),
                )?,
                None => conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?,
            };
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_message(row: &Row<'_>) -> Result<Message, rusqlite::Error> {
    let direction: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let record = MessageRecord {
        id: row.get(0)?,
        odna: row.get(1)?,
        direction: Direction::from_str(&direction)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        kind: MessageKind::from_str(&kind)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        text: row.get(4)?,
        image_url: row.get(5)?,
        timestamp: row.get(6)?,
        webhook_event_id: row.get(7)?,
    };
    Message::try_from(record)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_core::{Cursor, MessageBody};

    fn msg(id: &str, odna: &str, ts: i64) -> Message {
        Message {
            id: id.to_string(),
            counterpart_id: odna.to_string(),
            direction: Direction::Incoming,
            body: MessageBody::text(format!("text {id}")),
            timestamp: ts,
            webhook_event_id: None,
        }
    }

    async fn db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn duplicate_id_keeps_first_row() {
        let db = db().await;
        let first = msg("m1", "U1", 100);
        let mut second = msg("m1", "U1", 200);
        second.body = MessageBody::text("changed");

        assert!(insert_if_absent(&db, &first).await.unwrap().is_created());
        let dup = insert_if_absent(&db, &second).await.unwrap();
        assert_eq!(dup, Insertion::Duplicate(first.clone()));
        assert_eq!(count(&db, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn image_rows_round_trip() {
        let db = db().await;
        let mut m = msg("img", "U1", 5);
        m.body = MessageBody::image("https://blob/img.jpg");
        m.webhook_event_id = Some("evt-1".into());
        insert_if_absent(&db, &m).await.unwrap();

        let page = query_page(&db, &PageQuery::recent(10)).await.unwrap();
        assert_eq!(page.messages, vec![m]);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn page_is_newest_window_in_ascending_order() {
        let db = db().await;
        for ts in 1..=5 {
            insert_if_absent(&db, &msg(&format!("m{ts}"), "U1", ts)).await.unwrap();
        }

        let page = query_page(&db, &PageQuery::recent(3)).await.unwrap();
        let ids: Vec<_> = page.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m3", "m4", "m5"]);
        assert!(page.has_more);

        let older = query_page(&db, &PageQuery::recent(3).before(Cursor::at(3)))
            .await
            .unwrap();
        let ids: Vec<_> = older.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
        assert!(!older.has_more);
    }

    #[tokio::test]
    async fn exact_page_size_has_no_more() {
        let db = db().await;
        for ts in 1..=3 {
            insert_if_absent(&db, &msg(&format!("m{ts}"), "U1", ts)).await.unwrap();
        }
        let page = query_page(&db, &PageQuery::recent(3)).await.unwrap();
        assert_eq!(page.messages.len(), 3);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn counterpart_filter_excludes_others() {
        let db = db().await;
        insert_if_absent(&db, &msg("a", "U1", 1)).await.unwrap();
        insert_if_absent(&db, &msg("b", "U2", 2)).await.unwrap();
        insert_if_absent(&db, &msg("c", "U1", 3)).await.unwrap();

        let page = query_page(&db, &PageQuery::for_counterpart("U1", 10))
            .await
            .unwrap();
        assert!(page.messages.iter().all(|m| m.counterpart_id == "U1"));
        assert_eq!(page.messages.len(), 2);
        assert_eq!(count(&db, Some("U2")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn timestamp_only_cursor_skips_equal_timestamps() {
        let db = db().await;
        insert_if_absent(&db, &msg("a", "U1", 1)).await.unwrap();
        insert_if_absent(&db, &msg("b", "U1", 2)).await.unwrap();
        insert_if_absent(&db, &msg("c", "U1", 2)).await.unwrap();

        let page = query_page(&db, &PageQuery::recent(10).before(Cursor::at(2)))
            .await
            .unwrap();
        let ids: Vec<_> = page.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a"]);
    }

    #[tokio::test]
    async fn compound_cursor_pages_through_ties() {
        let db = db().await;
        for id in ["a", "b", "c", "d"] {
            insert_if_absent(&db, &msg(id, "U1", 7)).await.unwrap();
        }

        let first = query_page(&db, &PageQuery::recent(2)).await.unwrap();
        let ids: Vec<_> = first.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["c", "d"]);

        let cursor = first.messages[0].cursor();
        let second = query_page(&db, &PageQuery::recent(2).before(cursor))
            .await
            .unwrap();
        let ids: Vec<_> = second.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn empty_store_returns_empty_page() {
        let db = db().await;
        let page = query_page(&db, &PageQuery::recent(50)).await.unwrap();
        assert_eq!(page, Page::empty());
    }
}
