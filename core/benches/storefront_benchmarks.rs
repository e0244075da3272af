use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use std::sync::Arc;
use storefront::models::{CartItem, Product, SessionUser};
use storefront::{
  CartState, CartSync, Checkout, CheckoutOptions, ContextData, MemoryStore, RemoteStore, StepControl, StepDef,
  StoreError, Table, Workflow,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
}

fn bench_product(i: usize) -> Product {
  Product {
    id: Uuid::new_v4(),
    name: format!("Product {i}"),
    description: String::new(),
    price: Decimal::new(199 + i as i64, 2),
    image_url: String::new(),
    category: "bench".to_string(),
    stock_quantity: 100,
    created_at: Utc::now(),
  }
}

fn cart_of(lines: usize) -> CartState {
  let user_id = Uuid::new_v4();
  CartState {
    user: Some(SessionUser {
      id: user_id,
      email: None,
    }),
    items: (0..lines)
      .map(|i| {
        let product = bench_product(i);
        CartItem {
          id: Uuid::new_v4(),
          user_id,
          product_id: product.id,
          quantity: (i % 5) as i32 + 1,
          product: Some(product),
        }
      })
      .collect(),
  }
}

fn bench_workflow_steps(c: &mut Criterion) {
  let mut group = c.benchmark_group("WorkflowRun");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 5, 10] {
    let names: Vec<String> = (0..num_steps).map(|i| format!("step_{i}")).collect();
    let mut wf = Workflow::<BenchContext, StoreError>::new(names.iter().map(StepDef::new));
    for name in &names {
      wf.on(name, |ctx: ContextData<BenchContext>| async move {
        ctx.write().counter += 1;
        Ok::<_, StoreError>(StepControl::Continue)
      });
    }
    let wf = Arc::new(wf);

    group.throughput(Throughput::Elements(num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(BenchContext::default()),
        |ctx| {
          let wf = Arc::clone(&wf);
          async move { wf.run(ctx).await }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_cart_folds(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartFolds");
  for lines in [10usize, 100, 1000] {
    let state = cart_of(lines);
    group.throughput(Throughput::Elements(lines as u64));
    group.bench_with_input(BenchmarkId::new("total", lines), &state, |b, s| {
      b.iter(|| criterion::black_box(s.total()));
    });
    group.bench_with_input(BenchmarkId::new("count", lines), &state, |b, s| {
      b.iter(|| criterion::black_box(s.count()));
    });
  }
  group.finish();
}

fn bench_checkout_in_memory(c: &mut Criterion) {
  let mut group = c.benchmark_group("CheckoutInMemory");
  let rt = Runtime::new().unwrap();

  for lines in [1usize, 10] {
    group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, &lines| {
      b.to_async(&rt).iter_batched(
        || {
          let products: Vec<Product> = (0..lines).map(bench_product).collect();
          let store = MemoryStore::new();
          store.seed(Table::Products, &products).unwrap();
          (Arc::new(store) as Arc<dyn RemoteStore>, products)
        },
        |(store, products)| async move {
          let cart = Arc::new(CartSync::new(Arc::clone(&store)));
          let user = SessionUser {
            id: Uuid::new_v4(),
            email: None,
          };
          cart.load(Some(user)).await.unwrap();
          for product in &products {
            cart.add(product, 2).await.unwrap();
          }
          Checkout::new(store, cart, CheckoutOptions::default()).run().await.unwrap()
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

criterion_group!(benches, bench_workflow_steps, bench_cart_folds, bench_checkout_in_memory);
criterion_main!(benches);
