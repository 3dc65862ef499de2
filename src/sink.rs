use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ToSql};

use crate::error::{Error, Result};
use crate::freq::new_id;
use crate::srt::SrtItem;

/// Where loaded files, subtitle items and words get recorded.
pub trait WordSink {
    fn connect(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn insert_file(&mut self, file_name : &str) -> Result<String>;
    fn insert_srt_item(&mut self, item : &SrtItem, file_id : &str) -> Result<String>;
    fn insert_word(&mut self, word_id : &str, dictionary_form : &str, exact_form : &str, word_count : u64) -> Result<()>;
    fn insert_word_item_mapping(&mut self, word_id : &str, item_id : &str) -> Result<()>;
    fn clear_db(&mut self) -> Result<()>;
}

/// Records nothing, but still hands out fresh ids.
#[derive(Debug)]
#[derive(Default)]
pub struct NullSink;

impl WordSink for NullSink {
    fn connect(&mut self) -> Result<()>
    {
        Ok(())
    }
    fn commit(&mut self) -> Result<()>
    {
        Ok(())
    }
    fn close(&mut self) -> Result<()>
    {
        Ok(())
    }
    fn insert_file(&mut self, _file_name : &str) -> Result<String>
    {
        Ok(new_id())
    }
    fn insert_srt_item(&mut self, _item : &SrtItem, _file_id : &str) -> Result<String>
    {
        Ok(new_id())
    }
    fn insert_word(&mut self, _word_id : &str, _dictionary_form : &str, _exact_form : &str, _word_count : u64) -> Result<()>
    {
        Ok(())
    }
    fn insert_word_item_mapping(&mut self, _word_id : &str, _item_id : &str) -> Result<()>
    {
        Ok(())
    }
    fn clear_db(&mut self) -> Result<()>
    {
        Ok(())
    }
}

const SCHEMA : &str =
    "create table if not exists files (file_id text primary key, file_name text);
    create table if not exists srt_items
    (   item_id text primary key,
        file_id text,
        item_index integer,
        content text,
        start_time text, -- HH:MM:SS,mmm
        end_time text
    );
    create table if not exists words (word_id text primary key, dictionary_form text, exact_form text, word_count integer);
    create table if not exists word_item_mapping (word_id text, item_id text);";

/// SQLite-backed sink.
///
/// Until `connect` is called every statement runs on its own connection and
/// is committed immediately. After `connect`, statements share one
/// connection and stay in an open transaction until `commit`; `close`
/// without `commit` discards them.
pub struct SqliteSink {
    path : PathBuf,
    conn : Option<Connection>,
}

impl SqliteSink {
    pub fn new(path : &Path) -> SqliteSink
    {
        SqliteSink { path : path.to_path_buf(), conn : None }
    }
    pub fn is_connected(&self) -> bool
    {
        self.conn.is_some()
    }
    fn open(&self) -> Result<Connection>
    {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
    fn execute_query(&mut self, query : &str, parameters : &[&dyn ToSql]) -> Result<()>
    {
        match &self.conn
        {
            Some(conn) =>
            {
                if conn.is_autocommit()
                {
                    conn.execute_batch("begin")?;
                }
                conn.execute(query, parameters)?;
                Ok(())
            }
            None => self.execute_query_and_commit(|conn| conn.execute(query, parameters).map(|_| ()))
        }
    }
    // the connection lives only for this call and is dropped on every path
    fn execute_query_and_commit<F>(&self, statement : F) -> Result<()>
        where F : FnOnce(&Connection) -> rusqlite::Result<()>
    {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        statement(&tx)?;
        tx.commit()?;
        Ok(())
    }
}

impl WordSink for SqliteSink {
    fn connect(&mut self) -> Result<()>
    {
        if self.conn.is_none()
        {
            log::debug!("connecting to {}", self.path.display());
            self.conn = Some(self.open()?);
        }
        Ok(())
    }
    fn commit(&mut self) -> Result<()>
    {
        if let Some(conn) = &self.conn
        {
            if !conn.is_autocommit()
            {
                conn.execute_batch("commit")?;
            }
        }
        Ok(())
    }
    fn close(&mut self) -> Result<()>
    {
        if let Some(conn) = self.conn.take()
        {
            conn.close().map_err(|(_, err)| err)?;
        }
        Ok(())
    }
    fn insert_file(&mut self, file_name : &str) -> Result<String>
    {
        let file_id = new_id();
        self.execute_query("insert into files values (?,?)", params![file_id, file_name])?;
        Ok(file_id)
    }
    fn insert_srt_item(&mut self, item : &SrtItem, file_id : &str) -> Result<String>
    {
        let item_id = new_id();
        self.execute_query(
            "insert into srt_items values (?,?,?,?,?,?)",
            params![item_id, file_id, item.index, item.content(), item.start_time.to_string(), item.end_time.to_string()]
        )?;
        Ok(item_id)
    }
    fn insert_word(&mut self, word_id : &str, dictionary_form : &str, exact_form : &str, word_count : u64) -> Result<()>
    {
        // sqlite integers are signed 64-bit
        let stored_count = i64::try_from(word_count).map_err(|_| Error::CountOverflow(word_count))?;
        self.execute_query("insert into words values (?,?,?,?)", params![word_id, dictionary_form, exact_form, stored_count])
    }
    fn insert_word_item_mapping(&mut self, word_id : &str, item_id : &str) -> Result<()>
    {
        self.execute_query("insert into word_item_mapping values (?,?)", params![word_id, item_id])
    }
    fn clear_db(&mut self) -> Result<()>
    {
        self.execute_query_and_commit(|conn| conn.execute_batch("delete from files; delete from srt_items; delete from words; delete from word_item_mapping;"))
    }
}
