use std::ops::Range;
use std::str::FromStr;

use crate::BlockKind;
use crate::Context;
use crate::Expression;
use crate::MismatchKind;
use crate::Point;
use crate::StampError;
use crate::StampResult;
use crate::directive::Directive;
use crate::directive::classify;
use crate::scanner::Segment;
use crate::scanner::scan;

/// A parsed template.
///
/// A document never changes after [`parse`] returns it and can be rendered
/// any number of times, from any number of threads, as long as each render
/// gets its own [`Context`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
	nodes: Vec<DocumentNode>,
}

impl Document {
	/// The top level nodes in output order.
	pub fn nodes(&self) -> &[DocumentNode] {
		&self.nodes
	}

	/// Render this document against `context`. See [`crate::render`].
	pub fn render(&self, context: &mut Context) -> StampResult<String> {
		crate::render(self, context)
	}
}

impl FromStr for Document {
	type Err = StampError;

	fn from_str(template: &str) -> Result<Self, Self::Err> {
		parse(template)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
	/// Text copied to the output verbatim.
	Raw(String),
	/// `{{ expression }}`
	Expression(Expression),
	/// `{{ var name = value }}`
	VarDecl { name: String, value: Expression },
	/// `{{if}} ... {{elseif}} ... {{else}} ... {{endif}}`
	IfChain(Vec<Branch>),
	/// `{{for}} ... {{endfor}}`
	For(ForLoop),
}

/// One arm of an [`DocumentNode::IfChain`].
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
	pub kind: BranchKind,
	/// Absent only for `else`.
	pub condition: Option<Expression>,
	pub body: Vec<DocumentNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
	If,
	ElseIf,
	Else,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
	pub binding: ForBinding,
	pub iterable: Expression,
	pub body: Vec<DocumentNode>,
	/// Where the `for` tag starts, for runtime diagnostics.
	pub location: Point,
}

/// The names a `for` loop binds on each iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForBinding {
	/// `for value in iterable`
	Single(String),
	/// `for key, value in iterable`. The key is the index for lists.
	KeyValue { key: String, value: String },
}

/// Parse a template into a [`Document`].
///
/// ```rust
/// use stamp_core::Context;
/// use stamp_core::parse;
///
/// let document = parse("{{for i in range(3)}}{{i}}{{endfor}}").unwrap();
/// let output = document.render(&mut Context::new()).unwrap();
/// assert_eq!(output, "012");
/// ```
pub fn parse(template: impl AsRef<str>) -> StampResult<Document> {
	let template = template.as_ref();
	let segments = scan(template)?;
	let mut builder = TreeBuilder::new(template);

	for segment in segments {
		match segment {
			Segment::Raw(text) => builder.push(DocumentNode::Raw(text.to_string())),
			Segment::Tag { payload, tag } => {
				let directive = classify(template, payload)?;
				builder.apply(directive, tag)?;
			}
		}
	}

	let document = builder.finish()?;
	tracing::trace!(nodes = document.nodes.len(), "parsed template");

	Ok(document)
}

/// A block that has been opened but not yet closed.
enum Frame {
	IfChain {
		tag: Range<usize>,
		closed: Vec<Branch>,
		open: Branch,
	},
	For {
		tag: Range<usize>,
		binding: ForBinding,
		iterable: Expression,
		body: Vec<DocumentNode>,
	},
}

/// Pairs openers with closers using an explicit stack of open blocks.
struct TreeBuilder<'a> {
	template: &'a str,
	root: Vec<DocumentNode>,
	stack: Vec<Frame>,
}

impl<'a> TreeBuilder<'a> {
	fn new(template: &'a str) -> Self {
		Self {
			template,
			root: vec![],
			stack: vec![],
		}
	}

	/// The body new nodes are appended to.
	fn body(&mut self) -> &mut Vec<DocumentNode> {
		match self.stack.last_mut() {
			None => &mut self.root,
			Some(Frame::IfChain { open, .. }) => &mut open.body,
			Some(Frame::For { body, .. }) => body,
		}
	}

	fn push(&mut self, node: DocumentNode) {
		self.body().push(node);
	}

	fn mismatch(&self, kind: MismatchKind, tag: Range<usize>) -> StampError {
		StampError::tag_mismatch(self.template, kind, tag)
	}

	fn apply(&mut self, directive: Directive, tag: Range<usize>) -> StampResult<()> {
		let keyword = directive.keyword();

		match directive {
			Directive::Comment => {}
			Directive::Expression(expression) => self.push(DocumentNode::Expression(expression)),
			Directive::VarDecl { name, value } => self.push(DocumentNode::VarDecl { name, value }),
			Directive::If(condition) => {
				self.stack.push(Frame::IfChain {
					tag,
					closed: vec![],
					open: Branch {
						kind: BranchKind::If,
						condition: Some(condition),
						body: vec![],
					},
				});
			}
			Directive::ElseIf(_) | Directive::Else => {
				let Some(Frame::IfChain { closed, open, .. }) = self.stack.last_mut() else {
					return Err(self.mismatch(MismatchKind::WrongIfPair(keyword), tag));
				};

				if open.kind == BranchKind::Else {
					return Err(self.mismatch(MismatchKind::WrongIfPair(keyword), tag));
				}

				let next = match directive {
					Directive::ElseIf(condition) => {
						Branch {
							kind: BranchKind::ElseIf,
							condition: Some(condition),
							body: vec![],
						}
					}
					_ => {
						Branch {
							kind: BranchKind::Else,
							condition: None,
							body: vec![],
						}
					}
				};

				closed.push(std::mem::replace(open, next));
			}
			Directive::EndIf => {
				let Some(Frame::IfChain { .. }) = self.stack.last() else {
					return Err(self.mismatch(MismatchKind::WrongIfPair(keyword), tag));
				};

				if let Some(Frame::IfChain {
					mut closed, open, ..
				}) = self.stack.pop()
				{
					closed.push(open);
					self.push(DocumentNode::IfChain(closed));
				}
			}
			Directive::For { binding, iterable } => {
				self.stack.push(Frame::For {
					tag,
					binding,
					iterable,
					body: vec![],
				});
			}
			Directive::EndFor => {
				let Some(Frame::For { .. }) = self.stack.last() else {
					return Err(self.mismatch(MismatchKind::WrongForPair, tag));
				};

				if let Some(Frame::For {
					tag,
					binding,
					iterable,
					body,
				}) = self.stack.pop()
				{
					let location = Point::locate(self.template, tag.start);
					self.push(DocumentNode::For(ForLoop {
						binding,
						iterable,
						body,
						location,
					}));
				}
			}
		}

		Ok(())
	}

	/// Every block must be closed by the end of the template.
	fn finish(mut self) -> StampResult<Document> {
		match self.stack.pop() {
			None => Ok(Document { nodes: self.root }),
			Some(Frame::IfChain { tag, .. }) => {
				Err(self.mismatch(MismatchKind::UnclosedDirective(BlockKind::If), tag))
			}
			Some(Frame::For { tag, .. }) => {
				Err(self.mismatch(MismatchKind::UnclosedDirective(BlockKind::For), tag))
			}
		}
	}
}
