/// Schema statements contributed by a module.
///
/// `up` may hold several statements and must be safe to run on every
/// startup (`CREATE ... IF NOT EXISTS`); nothing records which ids ran.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}
