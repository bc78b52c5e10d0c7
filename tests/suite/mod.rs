mod export;
mod table;
