use crate::error::StorageError;
use crate::traits::PointStore;
use domain::Point;
use std::sync::RwLock;

/// 时序点内存存储
#[derive(Debug, Default)]
pub struct InMemoryPointStore {
    points: RwLock<Vec<Point>>,
}

impl InMemoryPointStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 按写入顺序返回全部时序点（用于测试）
    pub fn points(&self) -> Vec<Point> {
        self.points.read().map(|v| v.clone()).unwrap_or_default()
    }

    /// 获取当前累计的时序点数量（用于测试）
    pub fn len(&self) -> usize {
        self.points.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl PointStore for InMemoryPointStore {
    async fn write_point(&self, point: &Point) -> Result<(), StorageError> {
        let mut points = self
            .points
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        points.push(point.clone());
        Ok(())
    }
}
