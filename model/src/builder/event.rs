use super::TaskDefinitionBuild;
use super::task::{TaskDefinitionBuilder, TaskDefinitionMapBuilder};
use crate::definition::event::{
    CorrelationKeyDefinition, EventConsumptionKind, EventEmissionDefinition, EventReadMode,
    SubscriptionIteratorDefinition,
};
use crate::definition::task::{EmitTaskDefinition, ListenTaskDefinition, TaskDefinitionFields};
use crate::definition::{
    EventConsumptionStrategyDefinition, EventDefinition, EventFilterDefinition, ListenerDefinition,
    TaskDefinition,
};
use serde_json::Value;
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::{EquatableList, EquatableMap, OneOf};

#[derive(Debug, Clone, Default)]
pub struct EventDefinitionBuilder {
    with: EquatableMap<String, Value>,
}

impl EventDefinitionBuilder {
    pub fn with(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.with.insert(attribute.into(), value);
        self
    }

    pub fn with_type(self, type_: impl Into<String>) -> Self {
        self.with("type", Value::String(type_.into()))
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with("source", Value::String(source.into()))
    }

    pub fn with_data(self, data: Value) -> Self {
        self.with("data", data)
    }

    pub fn build(self) -> Result<EventDefinition> {
        let event = EventDefinition { with: self.with };
        if event.type_().is_none_or(|t| t.trim().is_empty()) {
            return Err(DefinitionError::missing("EventDefinition", "with.type"));
        }
        Ok(event)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilterDefinitionBuilder {
    with: EquatableMap<String, Value>,
    correlate: EquatableMap<String, CorrelationKeyDefinition>,
}

impl EventFilterDefinitionBuilder {
    pub fn with(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.with.insert(attribute.into(), value);
        self
    }

    pub fn with_type(self, type_: impl Into<String>) -> Self {
        self.with("type", Value::String(type_.into()))
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with("source", Value::String(source.into()))
    }

    pub fn correlate(
        mut self,
        key: impl Into<String>,
        from: impl Into<String>,
        expect: Option<String>,
    ) -> Self {
        self.correlate.insert(
            key.into(),
            CorrelationKeyDefinition {
                from: from.into(),
                expect,
            },
        );
        self
    }

    pub fn build(self) -> EventFilterDefinition {
        EventFilterDefinition {
            with: (!self.with.is_empty()).then_some(self.with),
            correlate: self.correlate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsumptionMode {
    All,
    Any,
    One,
}

/// Event consumption strategy. Switching between `all`, `any` and `one`
/// drops the filters collected so far.
#[derive(Debug, Clone, Default)]
pub struct ListenerDefinitionBuilder {
    mode: Option<ConsumptionMode>,
    filters: Vec<EventFilterDefinition>,
    until: Option<OneOf<Box<ListenerDefinitionBuilder>, String>>,
    read: Option<EventReadMode>,
}

impl ListenerDefinitionBuilder {
    fn add(
        mut self,
        mode: ConsumptionMode,
        configure: impl FnOnce(EventFilterDefinitionBuilder) -> EventFilterDefinitionBuilder,
    ) -> Self {
        if self.mode != Some(mode) || mode == ConsumptionMode::One {
            self.filters.clear();
        }
        self.mode = Some(mode);
        self.filters
            .push(configure(EventFilterDefinitionBuilder::default()).build());
        self
    }

    pub fn all(
        self,
        configure: impl FnOnce(EventFilterDefinitionBuilder) -> EventFilterDefinitionBuilder,
    ) -> Self {
        self.add(ConsumptionMode::All, configure)
    }

    pub fn any(
        self,
        configure: impl FnOnce(EventFilterDefinitionBuilder) -> EventFilterDefinitionBuilder,
    ) -> Self {
        self.add(ConsumptionMode::Any, configure)
    }

    pub fn one(
        self,
        configure: impl FnOnce(EventFilterDefinitionBuilder) -> EventFilterDefinitionBuilder,
    ) -> Self {
        self.add(ConsumptionMode::One, configure)
    }

    /// Consumes `any` events until the given strategy is satisfied.
    pub fn until(
        mut self,
        configure: impl FnOnce(ListenerDefinitionBuilder) -> ListenerDefinitionBuilder,
    ) -> Self {
        let until = configure(ListenerDefinitionBuilder::default());
        self.until = Some(OneOf::from_first(Box::new(until)));
        self
    }

    pub fn until_expression(mut self, condition: impl Into<String>) -> Self {
        self.until = Some(OneOf::from_second(condition.into()));
        self
    }

    pub fn read(mut self, mode: EventReadMode) -> Self {
        self.read = Some(mode);
        self
    }

    fn build_strategy(self) -> Result<EventConsumptionStrategyDefinition> {
        let kind = match self.mode {
            None => {
                return Err(DefinitionError::missing(
                    "EventConsumptionStrategyDefinition",
                    "to",
                ));
            }
            Some(ConsumptionMode::All) => {
                EventConsumptionKind::All(EquatableList::from(self.filters))
            }
            Some(ConsumptionMode::Any) => {
                EventConsumptionKind::Any(EquatableList::from(self.filters))
            }
            Some(ConsumptionMode::One) => {
                EventConsumptionKind::One(self.filters.into_iter().next().unwrap_or_default())
            }
        };
        let until = match self.until {
            None => None,
            Some(OneOf::First(until)) => Some(OneOf::from_first(Box::new(
                until.build_strategy().map_err(|e| e.within("until"))?,
            ))),
            Some(OneOf::Second(condition)) => Some(OneOf::from_second(condition)),
        };
        let strategy = EventConsumptionStrategyDefinition { kind, until };
        strategy.validate("to")?;
        Ok(strategy)
    }

    pub fn build(self) -> Result<ListenerDefinition> {
        let read = self.read;
        Ok(ListenerDefinition {
            to: self.build_strategy()?,
            read,
        })
    }
}

#[derive(Default)]
pub struct EmitTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    event: EventDefinitionBuilder,
}

impl EmitTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn event(
        mut self,
        configure: impl FnOnce(EventDefinitionBuilder) -> EventDefinitionBuilder,
    ) -> Self {
        self.event = configure(self.event);
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let event = self.event.build().map_err(|e| e.within("emit.event"))?;
        let task = EmitTaskDefinition {
            emit: EventEmissionDefinition { event },
        };
        Ok(TaskDefinition::new(task).with_fields(self.fields))
    }
}

#[derive(Default)]
pub struct ListenTaskDefinitionBuilder {
    fields: TaskDefinitionFields,
    listener: Option<ListenerDefinitionBuilder>,
    foreach: Option<(Option<String>, Option<String>, TaskDefinitionMapBuilder)>,
}

impl ListenTaskDefinitionBuilder {
    task_definition_fields!();

    pub fn to(
        mut self,
        configure: impl FnOnce(ListenerDefinitionBuilder) -> ListenerDefinitionBuilder,
    ) -> Self {
        self.listener = Some(configure(self.listener.take().unwrap_or_default()));
        self
    }

    /// Adds a task run for every consumed event, which is bound to `item`.
    pub fn foreach<B, F>(
        mut self,
        item: impl Into<String>,
        name: impl Into<String>,
        configure: F,
    ) -> Self
    where
        B: TaskDefinitionBuild + 'static,
        F: FnOnce(TaskDefinitionBuilder) -> B,
    {
        let (slot, _, tasks) = self.foreach.get_or_insert_with(Default::default);
        *slot = Some(item.into());
        *tasks = std::mem::take(tasks).do_(name, configure);
        self
    }

    pub fn foreach_at(mut self, index: impl Into<String>) -> Self {
        self.foreach.get_or_insert_with(Default::default).1 = Some(index.into());
        self
    }

    pub fn build(self) -> Result<TaskDefinition> {
        let Some(listener) = self.listener else {
            return Err(DefinitionError::missing("ListenTaskDefinition", "listen.to"));
        };
        let listen = listener.build().map_err(|e| e.within("listen"))?;
        let foreach = match self.foreach {
            None => None,
            Some((item, at, tasks)) => Some(SubscriptionIteratorDefinition {
                item,
                at,
                do_: tasks.build("foreach.do")?,
                ..Default::default()
            }),
        };
        let task = ListenTaskDefinition { listen, foreach };
        Ok(TaskDefinition::new(task).with_fields(self.fields))
    }
}

impl_task_build!(EmitTaskDefinitionBuilder, ListenTaskDefinitionBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TaskKind;
    use serde_json::json;

    #[test]
    fn test_emit_requires_type() {
        let err = TaskDefinitionBuilder
            .emit()
            .event(|e| e.with_source("https://example.com"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::MissingField { field, .. } if field == "emit.event.with.type"
        ));
        let task = TaskDefinitionBuilder
            .emit()
            .event(|e| {
                e.with_type("com.example.order.placed")
                    .with_source("https://shop.example.com")
                    .with_data(json!({"orderId": "${ .id }"}))
            })
            .build()
            .unwrap();
        let TaskKind::Emit(emit) = &task.kind else {
            panic!("expected emit");
        };
        assert_eq!(emit.emit.event.type_(), Some("com.example.order.placed"));
    }

    #[test]
    fn test_listener_strategies() {
        let listener = ListenerDefinitionBuilder::default()
            .all(|f| f.with_type("order.placed"))
            .all(|f| f.with_type("order.paid").correlate("orderId", ".data.id", None))
            .build()
            .unwrap();
        assert!(matches!(&listener.to.kind, EventConsumptionKind::All(f) if f.len() == 2));

        let switched = ListenerDefinitionBuilder::default()
            .all(|f| f.with_type("a"))
            .one(|f| f.with_type("b"))
            .build()
            .unwrap();
        assert!(matches!(&switched.to.kind, EventConsumptionKind::One(_)));

        let until = ListenerDefinitionBuilder::default()
            .any(|f| f.with_type("tick"))
            .until(|u| u.one(|f| f.with_type("stop")))
            .build()
            .unwrap();
        assert!(until.to.until.as_ref().is_some_and(|u| u.is_first()));
    }

    #[test]
    fn test_listener_until_requires_any() {
        let err = ListenerDefinitionBuilder::default()
            .one(|f| f.with_type("a"))
            .until_expression("${ true }")
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::MutuallyExclusive { .. }));
        assert!(matches!(
            ListenerDefinitionBuilder::default().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "to"
        ));
    }

    #[test]
    fn test_listen_task_builder() {
        assert!(matches!(
            TaskDefinitionBuilder.listen().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "listen.to"
        ));
        let task = TaskDefinitionBuilder
            .listen()
            .to(|l| l.any(|f| f.with_type("sensor.reading")).read(EventReadMode::Envelope))
            .foreach("reading", "store", |t| t.set().set("last", json!("${ $reading }")))
            .build()
            .unwrap();
        let TaskKind::Listen(listen) = &task.kind else {
            panic!("expected listen");
        };
        assert_eq!(listen.listen.read, Some(EventReadMode::Envelope));
        let foreach = listen.foreach.as_ref().unwrap();
        assert_eq!(foreach.item.as_deref(), Some("reading"));
        assert_eq!(foreach.do_.len(), 1);
    }
}
