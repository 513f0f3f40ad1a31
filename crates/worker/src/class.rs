/// How urgently a spawned task matters to the user, recorded on its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Requests that hold widget input locked until they settle.
	Interactive,
	/// Work nobody waits on, such as keep-alive pings.
	Background,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
