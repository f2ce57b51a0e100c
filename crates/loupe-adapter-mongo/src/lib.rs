//! MongoDB adapter for the Loupe document store.
//!
//! A thin pass-through over the official driver: every trait method maps to
//! one driver call, with no retries and no result reshaping. The client is
//! created lazily on first use and shared for the life of the process, so
//! constructing the adapter never touches the network.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use loupe_core::{
    CollectionSummary, DatabaseSummary, DocumentStore, FindQuery, GeoNearQuery, GeoPredicate,
    GeoShapeQuery, StoreConfig, TextQuery,
};
use mongodb::{Client, Collection, Database};
use tokio::sync::OnceCell;

/// MongoDB-backed document store.
pub struct MongoStore {
    url: String,
    client: OnceCell<Client>,
}

impl MongoStore {
    /// Create a store for the configured deployment. No connection is made
    /// until the first operation.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            url: config.url.clone(),
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> anyhow::Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                tracing::info!("Connecting to MongoDB");
                let client = Client::with_uri_str(&self.url).await?;
                Ok::<_, anyhow::Error>(client)
            })
            .await
    }

    async fn database(&self, db: &str) -> anyhow::Result<Database> {
        Ok(self.client().await?.database(db))
    }

    async fn collection(&self, db: &str, collection: &str) -> anyhow::Result<Collection<Document>> {
        Ok(self.database(db).await?.collection(collection))
    }
}

/// Merge an extra filter into a predicate document. Caller-supplied filter
/// keys lose on conflict; the predicate key wins.
fn merge_filter(mut predicate: Document, extra: Document) -> Document {
    for (key, value) in extra {
        predicate.entry(key).or_insert(value);
    }
    predicate
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_databases(&self) -> anyhow::Result<Vec<DatabaseSummary>> {
        let specs = self.client().await?.list_databases().await?;
        Ok(specs
            .into_iter()
            .map(|spec| DatabaseSummary {
                name: spec.name,
                size_on_disk: Some(spec.size_on_disk),
            })
            .collect())
    }

    async fn list_collections(&self, db: &str) -> anyhow::Result<Vec<CollectionSummary>> {
        let cursor = self.database(db).await?.list_collections().await?;
        let specs: Vec<_> = cursor.try_collect().await?;
        Ok(specs
            .into_iter()
            .map(|spec| CollectionSummary {
                name: spec.name,
                collection_type: format!("{:?}", spec.collection_type).to_lowercase(),
            })
            .collect())
    }

    async fn find(
        &self,
        db: &str,
        collection: &str,
        query: FindQuery,
    ) -> anyhow::Result<Vec<Document>> {
        let collection = self.collection(db, collection).await?;

        let mut action = collection.find(query.filter);
        if let Some(projection) = query.projection {
            action = action.projection(projection);
        }
        if let Some(sort) = query.sort {
            action = action.sort(sort);
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }

        Ok(action.await?.try_collect().await?)
    }

    async fn aggregate(
        &self,
        db: &str,
        collection: &str,
        mut pipeline: Vec<Document>,
        limit: Option<i64>,
    ) -> anyhow::Result<Vec<Document>> {
        let collection = self.collection(db, collection).await?;

        if let Some(limit) = limit {
            pipeline.push(doc! { "$limit": limit });
        }

        Ok(collection.aggregate(pipeline).await?.try_collect().await?)
    }

    async fn distinct(
        &self,
        db: &str,
        collection: &str,
        field: &str,
        filter: Document,
    ) -> anyhow::Result<Vec<Bson>> {
        let collection = self.collection(db, collection).await?;
        Ok(collection.distinct(field, filter).await?)
    }

    async fn sample(
        &self,
        db: &str,
        collection: &str,
        size: i64,
    ) -> anyhow::Result<Vec<Document>> {
        let collection = self.collection(db, collection).await?;
        let pipeline = vec![doc! { "$sample": { "size": size } }];
        Ok(collection.aggregate(pipeline).await?.try_collect().await?)
    }

    async fn count_documents(
        &self,
        db: &str,
        collection: &str,
        filter: Document,
    ) -> anyhow::Result<u64> {
        let collection = self.collection(db, collection).await?;
        Ok(collection.count_documents(filter).await?)
    }

    async fn collection_stats(&self, db: &str, collection: &str) -> anyhow::Result<Document> {
        let response = self
            .database(db)
            .await?
            .run_command(doc! { "collStats": collection })
            .await?;
        Ok(response)
    }

    async fn indexes(&self, db: &str, collection: &str) -> anyhow::Result<Vec<Document>> {
        let response = self
            .database(db)
            .await?
            .run_command(doc! { "listIndexes": collection })
            .await?;

        let batch = response
            .get_document("cursor")
            .and_then(|cursor| cursor.get_array("firstBatch"))?;
        Ok(batch
            .iter()
            .filter_map(Bson::as_document)
            .cloned()
            .collect())
    }

    async fn explain(
        &self,
        db: &str,
        collection: &str,
        query: FindQuery,
    ) -> anyhow::Result<Document> {
        let mut find = doc! {
            "find": collection,
            "filter": query.filter,
        };
        if let Some(projection) = query.projection {
            find.insert("projection", projection);
        }
        if let Some(sort) = query.sort {
            find.insert("sort", sort);
        }

        let response = self
            .database(db)
            .await?
            .run_command(doc! {
                "explain": find,
                "verbosity": "queryPlanner",
            })
            .await?;
        Ok(response)
    }

    async fn geo_near(
        &self,
        db: &str,
        collection: &str,
        query: GeoNearQuery,
    ) -> anyhow::Result<Vec<Document>> {
        let collection = self.collection(db, collection).await?;

        let mut stage = doc! {
            "near": {
                "type": "Point",
                "coordinates": [query.center.0, query.center.1],
            },
            "key": &query.location_field,
            "distanceField": &query.distance_field,
            "spherical": query.spherical,
        };
        if let Some(max) = query.max_distance {
            stage.insert("maxDistance", max);
        }
        if let Some(min) = query.min_distance {
            stage.insert("minDistance", min);
        }
        if !query.filter.is_empty() {
            stage.insert("query", query.filter);
        }

        // $geoNear must be the first stage of its pipeline.
        let mut pipeline = vec![doc! { "$geoNear": stage }];
        if let Some(limit) = query.limit {
            pipeline.push(doc! { "$limit": limit });
        }

        Ok(collection.aggregate(pipeline).await?.try_collect().await?)
    }

    async fn geo_shape(
        &self,
        db: &str,
        collection: &str,
        query: GeoShapeQuery,
    ) -> anyhow::Result<Vec<Document>> {
        let collection = self.collection(db, collection).await?;

        let operator = match query.predicate {
            GeoPredicate::Within => "$geoWithin",
            GeoPredicate::Intersects => "$geoIntersects",
        };
        let predicate = doc! {
            &query.location_field: {
                operator: { "$geometry": query.geometry }
            }
        };
        let filter = merge_filter(predicate, query.filter);

        let mut action = collection.find(filter);
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }
        Ok(action.await?.try_collect().await?)
    }

    async fn text_search(
        &self,
        db: &str,
        collection: &str,
        query: TextQuery,
    ) -> anyhow::Result<Vec<Document>> {
        let collection = self.collection(db, collection).await?;

        let predicate = doc! { "$text": { "$search": query.search } };
        let filter = merge_filter(predicate, query.filter);

        let mut action = collection.find(filter);
        if query.include_score {
            action = action
                .projection(doc! { "score": { "$meta": "textScore" } })
                .sort(doc! { "score": { "$meta": "textScore" } });
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }
        Ok(action.await?.try_collect().await?)
    }
}
