/*!
 * Guest Bindings
 * Explicit registration of the process object into guest scope
 *
 * Replaces reflective getter/method scanning with a plain table: every
 * guest-visible property and method is bound here, by name, to a concrete
 * host closure. What is not in the table does not exist for the guest.
 */

use super::context::ProcessContext;
use crate::guest::{GuestError, GuestOutcome, GuestValue};
use crate::streams::StreamSink;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Bound method: uniform call signature at the engine boundary
pub type Method = Box<dyn Fn(&[GuestValue]) -> GuestOutcome<GuestValue> + Send + Sync>;

/// Bound property getter
pub type Getter = Box<dyn Fn() -> GuestValue + Send + Sync>;

/// A structured value bound into guest scope: named properties, named
/// methods, and nested child objects.
pub struct GuestObject {
    name: &'static str,
    properties: BTreeMap<&'static str, Getter>,
    methods: BTreeMap<&'static str, Method>,
    children: BTreeMap<&'static str, GuestObject>,
}

impl GuestObject {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            properties: BTreeMap::new(),
            methods: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn bind_property(&mut self, name: &'static str, getter: Getter) {
        self.properties.insert(name, getter);
    }

    pub fn bind_method(&mut self, name: &'static str, method: Method) {
        self.methods.insert(name, method);
    }

    pub fn bind_child(&mut self, name: &'static str, child: GuestObject) {
        self.children.insert(name, child);
    }

    /// Read a bound property; `None` for names not in the table
    pub fn get(&self, name: &str) -> Option<GuestValue> {
        self.properties.get(name).map(|getter| getter())
    }

    /// Invoke a bound method
    pub fn call(&self, name: &str, args: &[GuestValue]) -> GuestOutcome<GuestValue> {
        match self.methods.get(name) {
            Some(method) => method(args),
            None => Err(GuestError::UnknownMember(format!("{}.{}", self.name, name)).into()),
        }
    }

    pub fn child(&self, name: &str) -> Option<&GuestObject> {
        self.children.get(name)
    }

    pub fn property_names(&self) -> Vec<&'static str> {
        self.properties.keys().copied().collect()
    }

    pub fn method_names(&self) -> Vec<&'static str> {
        self.methods.keys().copied().collect()
    }
}

/// Build the guest-visible `process` object over a shared context.
///
/// `argv` is deliberately unbound: the surface has no command-line view.
/// There is no stdin object either.
pub fn bind_process(ctx: Arc<ProcessContext>) -> GuestObject {
    let mut process = GuestObject::new("process");

    // Properties
    {
        let ctx = Arc::clone(&ctx);
        process.bind_property("version", Box::new(move || GuestValue::from(ctx.version())));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_property("platform", Box::new(move || GuestValue::from(ctx.platform())));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_property("execPath", Box::new(move || ctx.exec_path()));
    }

    // Stream children
    process.bind_child("stdout", bind_stream("stdout", Arc::clone(ctx.stdout())));
    process.bind_child("stderr", bind_stream("stderr", Arc::clone(ctx.stderr())));

    // Methods
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method("exit", Box::new(move |args| Err(ctx.exit(args.first()))));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method("abort", Box::new(move |_args| Err(ctx.abort())));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method("getenv", Box::new(move |_args| Ok(ctx.getenv())));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method("versions", Box::new(move |_args| Ok(ctx.versions())));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method("memoryUsage", Box::new(move |_args| Ok(ctx.memory_usage())));
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method(
            "uptime",
            Box::new(move |_args| Ok(GuestValue::Int(ctx.uptime() as i64))),
        );
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method(
            "hrtime",
            Box::new(move |_args| Ok(GuestValue::Int(ctx.hrtime() as i64))),
        );
    }
    {
        let ctx = Arc::clone(&ctx);
        process.bind_method(
            "nextTick",
            Box::new(move |args| {
                let callback = args
                    .first()
                    .and_then(GuestValue::as_callback)
                    .cloned()
                    .ok_or_else(|| {
                        GuestError::InvalidArgument("nextTick requires a callback".to_string())
                    })?;
                ctx.next_tick(Box::new(move || callback.invoke()))?;
                Ok(GuestValue::Undefined)
            }),
        );
    }

    debug!(
        "Bound process object: {} properties, {} methods",
        process.property_names().len(),
        process.method_names().len()
    );
    process
}

/// Build a guest-visible stream object over a shared sink
pub fn bind_stream(name: &'static str, sink: Arc<StreamSink>) -> GuestObject {
    let mut stream = GuestObject::new(name);

    {
        let sink = Arc::clone(&sink);
        stream.bind_property("writable", Box::new(move || GuestValue::Bool(sink.is_writable())));
    }
    stream.bind_method(
        "write",
        Box::new(move |args| {
            // No data is an accepted no-op, matching the minimal surface
            let Some(first) = args.first() else {
                return Ok(GuestValue::Bool(true));
            };
            let data = first.as_str().ok_or_else(|| {
                GuestError::InvalidArgument(format!(
                    "write expects string data, got {}",
                    first.type_name()
                ))
            })?;
            let encoding = match args.get(1) {
                None | Some(GuestValue::Undefined) => None,
                Some(value) => Some(value.as_str().ok_or_else(|| {
                    GuestError::InvalidArgument(format!(
                        "encoding name must be a string, got {}",
                        value.type_name()
                    ))
                })?),
            };
            let accepted = sink.write(data, encoding).map_err(GuestError::from)?;
            Ok(GuestValue::Bool(accepted))
        }),
    );

    stream
}
